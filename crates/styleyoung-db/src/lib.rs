//! # styleyoung-db: Database Layer for the StyleYoung Storefront
//!
//! SQLite storage for the catalog, carts, orders and accounts, accessed
//! through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       StyleYoung Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (POST /api/checkout)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  styleyoung-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │  │   │
//! │  │   │               │    │ Category Image │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ Product  Cart  │   │ 001_initial  │  │   │
//! │  │   │ WAL, FKs on   │    │ Size     Order │   │   _schema    │  │   │
//! │  │   │               │    │ User   Report  │   │              │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │                     ./styleyoung.db                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use styleyoung_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./styleyoung.db")).await?;
//!
//! let cart = db.carts().active_for_user(&user_id).await?;
//! db.carts().add_line(&cart.id, &product_id, &size_id, 2).await?;
//! let order = db.orders().checkout(&user_id, "Calle 10 # 43-12").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::cart::CartRepository;
pub use repository::category::CategoryRepository;
pub use repository::image::ImageRepository;
pub use repository::order::{OrderRepository, OrderStatusChange};
pub use repository::product::{ProductFilter, ProductRepository};
pub use repository::report::{OrderReportRow, ReportRepository, SalesReportRow};
pub use repository::size::SizeRepository;
pub use repository::user::UserRepository;
