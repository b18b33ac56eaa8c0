//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Filtered, ordered catalog listing ([`ProductFilter`])
//! - Live search for the header search box
//! - CRUD operations
//! - Sales counters, recomputed from delivered orders
//!
//! ## Listing Query
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How a Filtered Listing Is Built                      │
//! │                                                                         │
//! │  GET /api/products?brand=urbanstyle&min_price_cents=5000000&ordering=-price
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT p.*, c.name, Σ sizes.stock ... FROM products p JOIN categories │
//! │       │                                                                 │
//! │       ├── AND p.brand = ? COLLATE NOCASE      (only if brand given)    │
//! │       ├── AND p.price_cents >= ?              (only if min given)      │
//! │       └── ORDER BY p.price_cents DESC, p.created_at DESC               │
//! │                                                                         │
//! │  Stock is never stored on the product: it is summed from `sizes` on   │
//! │  every read.                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sales Counters
//! ```text
//!   admin refresh ─────────────┐
//!                              ├──► recount Σ quantity over delivered orders
//!   status change touching ────┘        (the only writer of sales_count)
//!   "delivered"
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::image::ImageRepository;
use crate::repository::size::SizeRepository;
use crate::repository::{new_id, timestamp};
use styleyoung_core::input::ProductInput;
use styleyoung_core::validation::{live_search_query, validate_search_query};
use styleyoung_core::{
    CatalogStats, CoreError, Product, ProductDetail, ProductOrdering, ProductSummary,
    LIVE_SEARCH_LIMIT,
};

// =============================================================================
// SQL Fragments
// =============================================================================

const PRODUCT_COLUMNS: &str = r#"
    id, category_id, name, description, price_cents, brand, color, material,
    primary_image, sales_count, created_at, updated_at
"#;

/// Listing row: product + category name + stock summed over sizes.
const SUMMARY_SELECT: &str = r#"
    SELECT
        p.id,
        p.name,
        p.price_cents,
        p.brand,
        p.color,
        p.category_id,
        c.name AS category_name,
        p.primary_image,
        COALESCE((SELECT SUM(s.stock) FROM sizes s WHERE s.product_id = p.id), 0) AS stock_total,
        p.sales_count,
        p.created_at
    FROM products p
    INNER JOIN categories c ON c.id = p.category_id
"#;

const STOCK_TOTAL_EXPR: &str =
    "COALESCE((SELECT SUM(s.stock) FROM sizes s WHERE s.product_id = p.id), 0)";

/// Σ quantity of the product's lines in delivered orders.
const RECOUNT_SALES: &str = r#"
    UPDATE products SET sales_count = COALESCE((
        SELECT SUM(ol.quantity)
        FROM order_lines ol
        INNER JOIN orders o ON o.id = ol.order_id
        WHERE ol.product_id = products.id
          AND o.status = 'delivered'
    ), 0)
"#;

/// `LIKE` pattern matching `term` anywhere, with wildcards in the term
/// itself escaped.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

// =============================================================================
// Filter
// =============================================================================

/// Catalog listing filter, deserialized straight from the query string.
///
/// Every field is optional; an empty filter lists the whole catalog newest
/// first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductFilter {
    pub category_id: Option<String>,
    /// Exact match, case-insensitive.
    pub brand: Option<String>,
    /// Exact match, case-insensitive.
    pub color: Option<String>,
    pub min_price_cents: Option<i64>,
    pub max_price_cents: Option<i64>,
    /// Substring over name, brand, description, color and material.
    pub search: Option<String>,
    /// `price`, `-price`, `created_at`, `-created_at`, `sales_count`,
    /// `-sales_count`.
    pub ordering: Option<String>,
}

impl ProductFilter {
    /// Filter for a single category.
    pub fn for_category(category_id: impl Into<String>) -> Self {
        ProductFilter {
            category_id: Some(category_id.into()),
            ..Default::default()
        }
    }

    /// Parsed ordering, defaulting to newest first.
    pub fn ordering(&self) -> Result<ProductOrdering, CoreError> {
        match self.ordering.as_deref().map(str::trim) {
            None | Some("") => Ok(ProductOrdering::default()),
            Some(raw) => Ok(raw.parse::<ProductOrdering>()?),
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let jeans = repo.list(&ProductFilter {
///     search: Some("jean".into()),
///     ordering: Some("-price".into()),
///     ..Default::default()
/// }).await?;
///
/// let detail = repo.get_detail(&jeans[0].id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists product summaries matching `filter`.
    ///
    /// ## Returns
    /// * `Err(DbError::Rule)` - unknown ordering or oversized search term
    pub async fn list(&self, filter: &ProductFilter) -> DbResult<Vec<ProductSummary>> {
        let ordering = filter.ordering()?;

        debug!(?filter, "Listing products");

        let mut qb = QueryBuilder::<Sqlite>::new(SUMMARY_SELECT);
        qb.push(" WHERE 1 = 1");

        if let Some(category_id) = &filter.category_id {
            qb.push(" AND p.category_id = ").push_bind(category_id.clone());
        }
        if let Some(brand) = filter.brand.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
            qb.push(" AND p.brand = ")
                .push_bind(brand.to_string())
                .push(" COLLATE NOCASE");
        }
        if let Some(color) = filter.color.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            qb.push(" AND p.color = ")
                .push_bind(color.to_string())
                .push(" COLLATE NOCASE");
        }
        if let Some(min) = filter.min_price_cents {
            qb.push(" AND p.price_cents >= ").push_bind(min);
        }
        if let Some(max) = filter.max_price_cents {
            qb.push(" AND p.price_cents <= ").push_bind(max);
        }
        if let Some(search) = &filter.search {
            let term = validate_search_query(search).map_err(CoreError::from)?;
            if !term.is_empty() {
                let pattern = contains_pattern(&term);
                qb.push(" AND (");
                let mut columns = qb.separated(" OR ");
                for column in ["p.name", "p.brand", "p.description", "p.color", "p.material"] {
                    columns
                        .push(format!("{} LIKE ", column))
                        .push_bind_unseparated(pattern.clone())
                        .push_unseparated(" ESCAPE '\\'");
                }
                qb.push(")");
            }
        }

        qb.push(" ORDER BY ").push(ordering.sql());

        let products = qb
            .build_query_as::<ProductSummary>()
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listing returned products");
        Ok(products)
    }

    /// Search-as-you-type over name, brand, description, category name,
    /// color and material.
    ///
    /// Queries shorter than two characters return nothing; at most ten
    /// results come back.
    pub async fn live_search(&self, query: &str) -> DbResult<Vec<ProductSummary>> {
        let Some(term) = live_search_query(query).map_err(CoreError::from)? else {
            return Ok(Vec::new());
        };

        debug!(query = %term, "Live search");

        let pattern = contains_pattern(&term);
        let sql = format!(
            r#"{}
            WHERE p.name LIKE ?1 ESCAPE '\'
               OR p.brand LIKE ?1 ESCAPE '\'
               OR p.description LIKE ?1 ESCAPE '\'
               OR c.name LIKE ?1 ESCAPE '\'
               OR p.color LIKE ?1 ESCAPE '\'
               OR p.material LIKE ?1 ESCAPE '\'
            ORDER BY p.created_at DESC
            LIMIT ?2
            "#,
            SUMMARY_SELECT
        );

        let products = sqlx::query_as::<_, ProductSummary>(&sql)
            .bind(pattern)
            .bind(LIVE_SEARCH_LIMIT)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE id = ?1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets the full product page: sizes, images, stock figures.
    pub async fn get_detail(&self, id: &str) -> DbResult<Option<ProductDetail>> {
        let Some(product) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let category_name: String =
            sqlx::query_scalar("SELECT name FROM categories WHERE id = ?1")
                .bind(&product.category_id)
                .fetch_one(&self.pool)
                .await?;

        let sizes = SizeRepository::new(self.pool.clone())
            .list_for_product(id)
            .await?;
        let images = ImageRepository::new(self.pool.clone())
            .list_for_product(id)
            .await?;

        Ok(Some(ProductDetail::new(product, category_name, sizes, images)))
    }

    /// Inserts a new product with a zero sales counter and no images.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - the category does not exist
    pub async fn insert(&self, input: &ProductInput) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: new_id(),
            category_id: input.category_id.clone(),
            name: input.name.trim().to_string(),
            description: input.description.clone(),
            price_cents: input.price_cents,
            brand: input.brand.trim().to_string(),
            color: input.color.trim().to_string(),
            material: input.material.trim().to_string(),
            primary_image: None,
            sales_count: 0,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, category_id, name, description, price_cents,
                brand, color, material, primary_image, sales_count,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL, 0, ?9, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.category_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(&product.brand)
        .bind(&product.color)
        .bind(&product.material)
        .bind(timestamp(now))
        .execute(&self.pool)
        .await
        .map_err(|e| missing_category(e, &product.category_id))?;

        Ok(product)
    }

    /// Updates the editable fields of a product.
    ///
    /// `sales_count` and `primary_image` are not editable here.
    pub async fn update(&self, id: &str, input: &ProductInput) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                category_id = ?2,
                name = ?3,
                description = ?4,
                price_cents = ?5,
                brand = ?6,
                color = ?7,
                material = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&input.category_id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.price_cents)
        .bind(input.brand.trim())
        .bind(input.color.trim())
        .bind(input.material.trim())
        .bind(timestamp(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(|e| missing_category(e, &input.category_id))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product together with its sizes, images and cart lines.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKeyViolation)` - the product appears in an order
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::ForeignKeyViolation { .. } => DbError::ForeignKeyViolation {
                    message: "product appears in order history".to_string(),
                },
                other => other,
            })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Σ stock over the product's sizes (0 when it has none).
    pub async fn stock_total(&self, id: &str) -> DbResult<i64> {
        let total: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(stock), 0) FROM sizes WHERE product_id = ?1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(total)
    }

    /// Products with at least one unit in stock, newest first.
    pub async fn in_stock(&self) -> DbResult<Vec<ProductSummary>> {
        let sql = format!(
            "{} WHERE {} > 0 ORDER BY p.created_at DESC",
            SUMMARY_SELECT, STOCK_TOTAL_EXPR
        );

        let products = sqlx::query_as::<_, ProductSummary>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Best sellers: `sales_count > 0`, highest first, ties newest first.
    pub async fn top_selling(&self, limit: u32) -> DbResult<Vec<ProductSummary>> {
        let sql = format!(
            "{} WHERE p.sales_count > 0 ORDER BY p.sales_count DESC, p.created_at DESC LIMIT ?1",
            SUMMARY_SELECT
        );

        let products = sqlx::query_as::<_, ProductSummary>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Aggregate catalog figures.
    pub async fn stats(&self) -> DbResult<CatalogStats> {
        let sql = format!(
            r#"
            SELECT
                COUNT(*) AS total_products,
                COALESCE(SUM(CASE WHEN {stock} > 0 THEN 1 ELSE 0 END), 0) AS available_products,
                COALESCE(SUM(CASE WHEN {stock} = 0 THEN 1 ELSE 0 END), 0) AS out_of_stock_products,
                COALESCE(SUM(p.sales_count), 0) AS total_units_sold,
                (SELECT COUNT(*) FROM categories) AS category_count
            FROM products p
            "#,
            stock = STOCK_TOTAL_EXPR
        );

        let stats = sqlx::query_as::<_, CatalogStats>(&sql)
            .fetch_one(&self.pool)
            .await?;

        Ok(stats)
    }

    /// Counts products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Rewrites every product's `sales_count` from delivered orders.
    ///
    /// ## Returns
    /// Number of products updated.
    pub async fn recompute_all_sales_counters(&self) -> DbResult<u64> {
        let result = sqlx::query(RECOUNT_SALES).execute(&self.pool).await?;

        info!(
            products = result.rows_affected(),
            "Sales counters recomputed from delivered orders"
        );
        Ok(result.rows_affected())
    }
}

/// Recomputes the counters of the products appearing in one order.
///
/// Runs on the caller's connection so it can share the status-change
/// transaction.
pub(crate) async fn recompute_sales_counters_for_order(
    conn: &mut SqliteConnection,
    order_id: &str,
) -> DbResult<u64> {
    let sql = format!(
        "{} WHERE id IN (SELECT product_id FROM order_lines WHERE order_id = ?1)",
        RECOUNT_SALES
    );

    let result = sqlx::query(&sql).bind(order_id).execute(conn).await?;

    debug!(
        order_id = %order_id,
        products = result.rows_affected(),
        "Sales counters recomputed for order"
    );
    Ok(result.rows_affected())
}

fn missing_category(err: sqlx::Error, category_id: &str) -> DbError {
    match DbError::from(err) {
        DbError::ForeignKeyViolation { .. } => DbError::not_found("Category", category_id),
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support;
    use styleyoung_core::input::ImageInput;
    use styleyoung_core::SizeLabel;

    struct Catalog {
        db: crate::Database,
        camiseta: Product,
        jean: Product,
        chaqueta: Product,
    }

    async fn catalog() -> Catalog {
        let db = test_support::db().await;
        let casual = test_support::category(&db, "Ropa Casual").await;
        let formal = test_support::category(&db, "Formal").await;

        let camiseta = test_support::product(&db, &casual, "Camiseta Básica", 4_500_000).await;
        let jean = test_support::product(&db, &casual, "Jean Slim", 12_000_000).await;
        let chaqueta = db
            .products()
            .insert(&ProductInput {
                category_id: formal,
                name: "Chaqueta de Cuero".to_string(),
                description: Some("Chaqueta clásica".to_string()),
                price_cents: 35_000_000,
                brand: "LeatherCo".to_string(),
                color: "Negro".to_string(),
                material: "Cuero".to_string(),
            })
            .await
            .unwrap();

        test_support::size(&db, &camiseta.id, SizeLabel::S, 10).await;
        test_support::size(&db, &camiseta.id, SizeLabel::M, 15).await;
        test_support::size(&db, &camiseta.id, SizeLabel::L, 8).await;
        test_support::size(&db, &jean.id, SizeLabel::M, 0).await;
        test_support::size(&db, &chaqueta.id, SizeLabel::L, 3).await;

        Catalog {
            db,
            camiseta,
            jean,
            chaqueta,
        }
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("jean"), "%jean%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_filter_ordering() {
        assert_eq!(
            ProductFilter::default().ordering().unwrap(),
            ProductOrdering::CreatedDesc
        );
        let filter = ProductFilter {
            ordering: Some("-price".to_string()),
            ..Default::default()
        };
        assert_eq!(filter.ordering().unwrap(), ProductOrdering::PriceDesc);

        let bad = ProductFilter {
            ordering: Some("name".to_string()),
            ..Default::default()
        };
        assert!(matches!(bad.ordering(), Err(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_stock_total_sums_sizes() {
        let c = catalog().await;
        let products = c.db.products();

        assert_eq!(products.stock_total(&c.camiseta.id).await.unwrap(), 33);
        assert_eq!(products.stock_total(&c.jean.id).await.unwrap(), 0);
        assert_eq!(products.stock_total("missing").await.unwrap(), 0);

        let listed = products.list(&ProductFilter::default()).await.unwrap();
        let camiseta = listed.iter().find(|p| p.id == c.camiseta.id).unwrap();
        assert_eq!(camiseta.stock_total, 33);
        assert_eq!(camiseta.category_name, "Ropa Casual");
    }

    #[tokio::test]
    async fn test_list_filters() {
        let c = catalog().await;
        let products = c.db.products();

        let by_category = products
            .list(&ProductFilter::for_category(c.chaqueta.category_id.clone()))
            .await
            .unwrap();
        assert_eq!(by_category.len(), 1);
        assert_eq!(by_category[0].id, c.chaqueta.id);

        let by_brand = products
            .list(&ProductFilter {
                brand: Some("leatherco".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_brand.len(), 1);

        let by_price = products
            .list(&ProductFilter {
                min_price_cents: Some(5_000_000),
                max_price_cents: Some(20_000_000),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_price.len(), 1);
        assert_eq!(by_price[0].id, c.jean.id);

        let by_search = products
            .list(&ProductFilter {
                search: Some("cuero".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_search.len(), 1);
        assert_eq!(by_search[0].id, c.chaqueta.id);
    }

    #[tokio::test]
    async fn test_list_ordering() {
        let c = catalog().await;

        let by_price = c
            .db
            .products()
            .list(&ProductFilter {
                ordering: Some("price".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        let prices: Vec<i64> = by_price.iter().map(|p| p.price_cents).collect();
        assert_eq!(prices, vec![4_500_000, 12_000_000, 35_000_000]);

        let newest = c.db.products().list(&ProductFilter::default()).await.unwrap();
        assert_eq!(newest[0].id, c.chaqueta.id);
    }

    #[tokio::test]
    async fn test_live_search() {
        let c = catalog().await;
        let products = c.db.products();

        assert!(products.live_search("j").await.unwrap().is_empty());
        assert!(products.live_search("  ").await.unwrap().is_empty());

        let hits = products.live_search("jean").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, c.jean.id);

        // Category names are searched too
        let formal = products.live_search("formal").await.unwrap();
        assert_eq!(formal.len(), 1);
        assert_eq!(formal[0].id, c.chaqueta.id);
    }

    #[tokio::test]
    async fn test_live_search_caps_results() {
        let db = test_support::db().await;
        let category = test_support::category(&db, "Básicos").await;
        for i in 0..12 {
            test_support::product(&db, &category, &format!("Camiseta {}", i), 3_000_000).await;
        }

        let hits = db.products().live_search("camiseta").await.unwrap();
        assert_eq!(hits.len(), LIVE_SEARCH_LIMIT as usize);
    }

    #[tokio::test]
    async fn test_detail() {
        let c = catalog().await;
        c.db.images()
            .insert(
                &c.camiseta.id,
                &ImageInput {
                    file_ref: "products/camiseta.jpg".to_string(),
                    description: None,
                    is_primary: true,
                    display_order: 0,
                },
            )
            .await
            .unwrap();

        let detail = c
            .db
            .products()
            .get_detail(&c.camiseta.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(detail.category_name, "Ropa Casual");
        assert_eq!(detail.sizes.len(), 3);
        assert_eq!(detail.stock_total, 33);
        assert!(detail.available);
        assert_eq!(detail.images.len(), 1);
        assert_eq!(
            detail.product.primary_image.as_deref(),
            Some("products/camiseta.jpg")
        );

        let jean = c.db.products().get_detail(&c.jean.id).await.unwrap().unwrap();
        assert!(!jean.available);
        assert!(jean.available_sizes.is_empty());

        assert!(c.db.products().get_detail("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_stock_and_stats() {
        let c = catalog().await;

        let in_stock = c.db.products().in_stock().await.unwrap();
        assert_eq!(in_stock.len(), 2);
        assert!(in_stock.iter().all(|p| p.stock_total > 0));

        let stats = c.db.products().stats().await.unwrap();
        assert_eq!(stats.total_products, 3);
        assert_eq!(stats.available_products, 2);
        assert_eq!(stats.out_of_stock_products, 1);
        assert_eq!(stats.total_units_sold, 0);
        assert_eq!(stats.category_count, 2);
    }

    #[tokio::test]
    async fn test_insert_with_unknown_category() {
        let db = test_support::db().await;
        let err = db
            .products()
            .insert(&ProductInput {
                category_id: "missing".to_string(),
                name: "Gorra".to_string(),
                description: None,
                price_cents: 1_000_000,
                brand: "CapCo".to_string(),
                color: "Rojo".to_string(),
                material: "Algodón".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "Category"));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let c = catalog().await;

        let updated = c
            .db
            .products()
            .update(
                &c.jean.id,
                &ProductInput {
                    category_id: c.jean.category_id.clone(),
                    name: "Jean Slim Fit".to_string(),
                    description: None,
                    price_cents: 11_000_000,
                    brand: "DenimCo".to_string(),
                    color: "Azul".to_string(),
                    material: "Denim".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Jean Slim Fit");
        assert_eq!(updated.price_cents, 11_000_000);

        c.db.products().delete(&c.jean.id).await.unwrap();
        assert!(c.db.products().get_by_id(&c.jean.id).await.unwrap().is_none());
        // Sizes cascade
        assert!(c
            .db
            .sizes()
            .list_for_product(&c.jean.id)
            .await
            .unwrap()
            .is_empty());

        assert!(matches!(
            c.db.products().delete(&c.jean.id).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
