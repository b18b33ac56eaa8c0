//! # styleyoung-core: Pure Domain Logic for the StyleYoung Storefront
//!
//! Everything the storefront knows about clothes, carts and orders that does
//! not need a database or a network connection lives here.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     StyleYoung Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 storefront-api (axum)                           │   │
//! │  │   /api/products ──► /api/cart ──► /api/checkout ──► /api/admin │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           styleyoung-db / -reports / -weather                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ styleyoung-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ PricedLine│  │   rules   │  │   │
//! │  │   │   Order   │  │  Display  │  │  totals   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Category, Product, Size, Cart, Order, User)
//! - [`money`] - Money type with integer arithmetic
//! - [`cart`] - Cart line and total calculations
//! - [`input`] - Create/update payloads with their validation
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use styleyoung_core::cart::{cart_total, PricedLine};
//! use styleyoung_core::money::Money;
//!
//! let lines = [
//!     PricedLine::new(Money::from_major(45_000), 2),
//!     PricedLine::new(Money::from_major(80_000), 1),
//! ];
//!
//! assert_eq!(cart_total(&lines), Money::from_major(170_000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod input;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single cart line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// A product counts as "low stock" on the dashboard when any of its sizes
/// has fewer units than this.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Live search ignores queries shorter than this (after trimming).
pub const LIVE_SEARCH_MIN_CHARS: usize = 2;

/// Maximum suggestions returned by live search.
pub const LIVE_SEARCH_LIMIT: u32 = 10;

/// Best sellers shown on the admin dashboard.
pub const DASHBOARD_TOP_SELLERS: u32 = 3;

/// Recent orders shown on the admin dashboard.
pub const DASHBOARD_RECENT_ORDERS: u32 = 5;

/// Best sellers listed on the sales report and the public best-seller feed.
pub const REPORT_TOP_SELLERS: u32 = 10;

/// Store name printed in report footers.
pub const STORE_NAME: &str = "StyleYoung - Tienda Virtual de Ropa";
