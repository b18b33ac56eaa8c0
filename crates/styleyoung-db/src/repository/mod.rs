//! # Repository Module
//!
//! Database repository implementations for the storefront.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.carts().add_line(&user_id, &product_id, &size_id, 2)       │
//! │       ▼                                                                 │
//! │  CartRepository                                                        │
//! │  ├── active_for_user / view                                            │
//! │  ├── add_line / update_line_quantity / remove_line / clear             │
//! │  └── (recomputes the cached total after every change)                  │
//! │       │                                                                 │
//! │       │  SQL (runtime-checked sqlx queries)                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`category::CategoryRepository`] - Categories and their product counts
//! - [`product::ProductRepository`] - Catalog listing, search, counters
//! - [`size::SizeRepository`] - Per-size stock
//! - [`image::ImageRepository`] - Product images and the primary image
//! - [`cart::CartRepository`] - Active carts and their lines
//! - [`order::OrderRepository`] - Checkout and order history
//! - [`user::UserRepository`] - Accounts
//! - [`report::ReportRepository`] - Dashboard and report datasets

pub mod cart;
pub mod category;
pub mod image;
pub mod order;
pub mod product;
pub mod report;
pub mod size;
pub mod user;

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

/// Generates a new row ID.
pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Stored timestamp text.
///
/// Fixed microsecond precision keeps the TEXT columns ordering the same way
/// the instants do.
pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}
