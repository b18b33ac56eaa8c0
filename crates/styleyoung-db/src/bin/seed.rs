//! # Seed Data Generator
//!
//! Populates the database with a demo clothing catalog and a staff account
//! for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./styleyoung.db with the default admin (admin@styleyoung.co)
//! cargo run -p styleyoung-db --bin seed
//!
//! # Custom database and admin credentials
//! cargo run -p styleyoung-db --bin seed -- --db ./data/shop.db \
//!     --admin-email jefe@styleyoung.co --admin-password "otra-clave-segura"
//! ```
//!
//! ## Generated Data
//! - 4 categories (Ropa Casual, Ropa Formal, Deportiva, Accesorios)
//! - A dozen products, each with XS..XL stock that varies per product
//! - One primary image reference per product
//! - A staff account able to use the admin routes

use std::env;

use anyhow::Context;
use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHasher};
use styleyoung_core::input::{CategoryInput, ImageInput, ProductInput, SizeInput};
use styleyoung_core::SizeLabel;
use styleyoung_db::{Database, DbConfig};

/// (category, description, products)
/// Each product: (name, brand, color, material, price in pesos)
const CATALOG: &[(&str, &str, &[(&str, &str, &str, &str, i64)])] = &[
    (
        "Ropa Casual",
        "Prendas cómodas para el día a día",
        &[
            ("Camiseta Básica", "BasicWear", "Blanco", "Algodón", 45_000),
            ("Jean Slim", "DenimCo", "Azul", "Denim", 120_000),
            ("Buzo con Capota", "UrbanStyle", "Gris", "Algodón", 95_000),
            ("Camisa de Lino", "CoastLine", "Beige", "Lino", 85_000),
        ],
    ),
    (
        "Ropa Formal",
        "Trajes, camisas y pantalones de vestir",
        &[
            ("Camisa Oxford", "Elegance", "Celeste", "Algodón", 110_000),
            ("Pantalón de Vestir", "Elegance", "Negro", "Poliéster", 140_000),
            ("Blazer Clásico", "Sastrería Andina", "Azul Oscuro", "Lana", 350_000),
        ],
    ),
    (
        "Deportiva",
        "Ropa para entrenar",
        &[
            ("Leggings Deportivos", "FitPro", "Negro", "Licra", 75_000),
            ("Camiseta Dry-Fit", "FitPro", "Rojo", "Poliéster", 55_000),
            ("Sudadera Running", "RunFast", "Verde", "Poliéster", 90_000),
        ],
    ),
    (
        "Accesorios",
        "Gorras, bolsos y complementos",
        &[
            ("Gorra Snapback", "UrbanStyle", "Negro", "Algodón", 40_000),
            ("Chaqueta de Cuero", "LeatherCo", "Café", "Cuero", 420_000),
        ],
    ),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./styleyoung.db");
    let mut admin_email = String::from("admin@styleyoung.co");
    let mut admin_password = String::from("styleyoung-admin");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--admin-email" => {
                if i + 1 < args.len() {
                    admin_email = args[i + 1].clone();
                    i += 1;
                }
            }
            "--admin-password" => {
                if i + 1 < args.len() {
                    admin_password = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("StyleYoung Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>             Database file path (default: ./styleyoung.db)");
                println!("      --admin-email <EMAIL>   Staff login (default: admin@styleyoung.co)");
                println!("      --admin-password <PW>   Staff password (default: styleyoung-admin)");
                println!("  -h, --help                  Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("Ignoring unknown argument: {}", other);
            }
        }
        i += 1;
    }

    println!("🌱 StyleYoung Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("opening {}", db_path))?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping catalog seed to avoid duplicates.");
    } else {
        seed_catalog(&db).await?;
    }

    seed_admin(&db, &admin_email, &admin_password).await?;

    let stats = db.products().stats().await?;
    println!();
    println!(
        "✓ Seed complete: {} products ({} in stock) in {} categories",
        stats.total_products, stats.available_products, stats.category_count
    );

    Ok(())
}

async fn seed_catalog(db: &Database) -> anyhow::Result<()> {
    println!();
    println!("Generating catalog...");

    let mut seed = 0usize;
    for (category_name, description, products) in CATALOG {
        let category = db
            .categories()
            .insert(&CategoryInput {
                name: category_name.to_string(),
                description: Some(description.to_string()),
            })
            .await?;

        for (name, brand, color, material, pesos) in products.iter() {
            let product = db
                .products()
                .insert(&ProductInput {
                    category_id: category.id.clone(),
                    name: name.to_string(),
                    description: Some(format!("{} {} de {}", name, color.to_lowercase(), material.to_lowercase())),
                    price_cents: pesos * 100,
                    brand: brand.to_string(),
                    color: color.to_string(),
                    material: material.to_string(),
                })
                .await?;

            for (idx, label) in SizeLabel::ALL.iter().enumerate() {
                // 0..=24 units; some sizes sold out, some under the low-stock line
                let stock = ((seed * 7 + idx * 5) % 25) as i64;
                db.sizes()
                    .insert(&product.id, &SizeInput { label: *label, stock })
                    .await?;
            }

            db.images()
                .insert(
                    &product.id,
                    &ImageInput {
                        file_ref: format!("products/{}.jpg", slug(name)),
                        description: Some(name.to_string()),
                        is_primary: true,
                        display_order: 0,
                    },
                )
                .await?;

            seed += 1;
        }

        println!("  {} → {} products", category_name, products.len());
    }

    Ok(())
}

async fn seed_admin(db: &Database, email: &str, password: &str) -> anyhow::Result<()> {
    if let Some(user) = db.users().get_by_email(email).await? {
        if !user.is_staff {
            db.users().set_staff(&user.id, true).await?;
            println!("✓ Promoted {} to staff", email);
        } else {
            println!("✓ Staff account {} already exists", email);
        }
        return Ok(());
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("hashing admin password: {}", e))?
        .to_string();

    let username = email.split('@').next().unwrap_or("admin");
    db.users()
        .insert(
            username,
            email,
            "Administrador StyleYoung",
            "Medellín, Colombia",
            "6040000000",
            &hash,
            true,
        )
        .await?;

    println!("✓ Created staff account {}", email);
    Ok(())
}

/// "Camiseta Básica" → "camiseta-basica"
fn slug(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' => 'u',
            'ñ' => 'n',
            c if c.is_ascii_alphanumeric() => c,
            _ => '-',
        })
        .collect()
}
