//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Category 1──* Product 1──* Size          (stock per size label)       │
//! │                   │    1──* ProductImage  (at most one primary)        │
//! │                   │                                                     │
//! │  User 1──* Cart 1──* CartLine ──► (Product, Size)                      │
//! │     │                                                                   │
//! │     └──* Order 1──* OrderLine             (unit price snapshot)        │
//! │                                                                         │
//! │  Enums: SizeLabel (XS..XL), OrderStatus (pending..cancelled)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Row types derive `sqlx::FromRow` when the `sqlx` feature is on, so the
//! database crate can map query results straight into them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::money::Money;

// =============================================================================
// Size Label
// =============================================================================

/// Clothing size of a product variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum SizeLabel {
    Xs,
    S,
    M,
    L,
    Xl,
}

impl SizeLabel {
    /// Every label, smallest first.
    pub const ALL: [SizeLabel; 5] = [
        SizeLabel::Xs,
        SizeLabel::S,
        SizeLabel::M,
        SizeLabel::L,
        SizeLabel::Xl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SizeLabel::Xs => "XS",
            SizeLabel::S => "S",
            SizeLabel::M => "M",
            SizeLabel::L => "L",
            SizeLabel::Xl => "XL",
        }
    }
}

impl fmt::Display for SizeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeLabel {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SizeLabel::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| crate::error::ValidationError::NotAllowed {
                field: "size".to_string(),
                allowed: SizeLabel::ALL.iter().map(|l| l.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle state of an order.
///
/// ```text
/// pending ──► processing ──► shipped ──► delivered
///    │             │            │
///    └─────────────┴────────────┴──────► cancelled
/// ```
///
/// Checkout creates orders directly in `Processing`. Only `Delivered`
/// orders count towards a product's sales counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Whether moving from `self` to `next` changes which orders count as
    /// delivered, and therefore the sales counters of the order's products.
    pub fn affects_sales_count(&self, next: OrderStatus) -> bool {
        *self != next && (*self == OrderStatus::Delivered || next == OrderStatus::Delivered)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::InvalidOrderStatus(s.to_string()))
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// A product category ("Camisetas", "Pantalones", ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Category plus the number of products filed under it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CategoryWithCount {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub product_count: i64,
}

/// A product available in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub category_id: String,

    pub name: String,

    pub description: Option<String>,

    /// Price in cents.
    pub price_cents: i64,

    pub brand: String,

    pub color: String,

    pub material: String,

    /// File reference of the primary image, mirrored from `product_images`.
    pub primary_image: Option<String>,

    /// Units sold across delivered orders.
    ///
    /// Denormalized for the best-seller queries; only ever rewritten by the
    /// delivered-orders recount.
    pub sales_count: i64,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Listing row: a product with its category name and computed stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductSummary {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub brand: String,
    pub color: String,
    pub category_id: String,
    pub category_name: String,
    pub primary_image: Option<String>,
    /// Sum of stock across all sizes, computed on read.
    pub stock_total: i64,
    pub sales_count: i64,
    pub created_at: DateTime<Utc>,
}

impl ProductSummary {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Everything the product page needs.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub category_name: String,
    pub sizes: Vec<Size>,
    /// Sizes with at least one unit in stock.
    pub available_sizes: Vec<Size>,
    pub images: Vec<ProductImage>,
    pub stock_total: i64,
    pub available: bool,
}

impl ProductDetail {
    /// Assembles the detail view, deriving the stock figures from `sizes`.
    pub fn new(
        product: Product,
        category_name: String,
        sizes: Vec<Size>,
        images: Vec<ProductImage>,
    ) -> Self {
        let stock_total = stock_total(&sizes);
        let available_sizes = sizes.iter().filter(|s| s.stock > 0).cloned().collect();

        ProductDetail {
            product,
            category_name,
            sizes,
            available_sizes,
            images,
            stock_total,
            available: stock_total > 0,
        }
    }
}

/// Stock of one size of one product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Size {
    pub id: String,
    pub product_id: String,
    pub label: SizeLabel,
    pub stock: i64,
}

/// Total units across a product's sizes.
pub fn stock_total(sizes: &[Size]) -> i64 {
    sizes.iter().map(|s| s.stock).sum()
}

/// An additional picture of a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductImage {
    pub id: String,
    pub product_id: String,
    /// Storage path or URL of the file.
    pub file_ref: String,
    pub description: Option<String>,
    pub is_primary: bool,
    pub display_order: i64,
    pub uploaded_at: DateTime<Utc>,
}

/// Aggregate catalog figures for the public stats endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CatalogStats {
    pub total_products: i64,
    pub available_products: i64,
    pub out_of_stock_products: i64,
    pub total_units_sold: i64,
    pub category_count: i64,
}

// =============================================================================
// Cart
// =============================================================================

/// A user's shopping cart.
///
/// Retired carts keep `active = false` and their lines, so the history of
/// what was checked out stays queryable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Cart {
    pub id: String,
    pub user_id: String,
    /// Cached Σ quantity × price, rewritten on every mutation.
    pub total_cents: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Cart {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// One (product, size, quantity) entry of a cart, joined with display data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CartLineView {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub primary_image: Option<String>,
    pub size_id: String,
    pub size_label: SizeLabel,
    /// Current product price.
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub line_total_cents: i64,
}

/// A cart with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    #[serde(flatten)]
    pub cart: Cart,
    pub lines: Vec<CartLineView>,
    /// Σ quantity.
    pub item_count: i64,
}

impl CartView {
    pub fn new(cart: Cart, lines: Vec<CartLineView>) -> Self {
        let item_count = lines.iter().map(|l| l.quantity).sum();
        CartView {
            cart,
            lines,
            item_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Orders
// =============================================================================

/// An order placed at checkout.
///
/// Immutable after creation except for `status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub total_cents: i64,
    pub status: OrderStatus,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A purchased line of an order.
/// Uses snapshot pattern to freeze product data at time of checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub size_id: String,
    /// Product name at time of checkout (frozen).
    pub product_name: String,
    /// Size label at time of checkout (frozen).
    pub size_label: SizeLabel,
    pub quantity: i64,
    /// Unit price in cents at time of checkout (frozen).
    pub unit_price_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl OrderLine {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

/// An order with its lines, as shown in order history.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithLines {
    #[serde(flatten)]
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

// =============================================================================
// Users
// =============================================================================

/// A registered customer or staff member.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub username: String,
    /// Login identifier.
    pub email: String,
    pub full_name: String,
    pub address: String,
    pub phone: String,
    /// Argon2 PHC string. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Reporting
// =============================================================================

/// Units sold per category (Σ of the products' sales counters).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CategorySales {
    pub category_id: String,
    pub category_name: String,
    pub units_sold: i64,
}

/// Admin dashboard figures.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_products: i64,
    pub total_orders: i64,
    pub total_categories: i64,
    /// Products with at least one size below the low-stock threshold.
    pub low_stock_products: i64,
    pub top_sellers: Vec<ProductSummary>,
    pub recent_orders: Vec<Order>,
    /// Revenue of delivered orders placed since the start of the month.
    pub month_revenue_cents: i64,
    pub month_delivered_orders: i64,
}

/// Admin sales report.
#[derive(Debug, Clone, Serialize)]
pub struct SalesReport {
    pub top_sellers: Vec<ProductSummary>,
    pub by_category: Vec<CategorySales>,
}

// =============================================================================
// Catalog Ordering
// =============================================================================

/// Sort order accepted by the product listing.
///
/// Parsed from the REST-style `ordering` parameter: a field name, optionally
/// prefixed with `-` for descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductOrdering {
    PriceAsc,
    PriceDesc,
    CreatedAsc,
    #[default]
    CreatedDesc,
    SalesAsc,
    SalesDesc,
}

impl ProductOrdering {
    /// SQL `ORDER BY` body for this ordering over the `p` products alias.
    pub fn sql(&self) -> &'static str {
        match self {
            ProductOrdering::PriceAsc => "p.price_cents ASC, p.created_at DESC",
            ProductOrdering::PriceDesc => "p.price_cents DESC, p.created_at DESC",
            ProductOrdering::CreatedAsc => "p.created_at ASC",
            ProductOrdering::CreatedDesc => "p.created_at DESC",
            ProductOrdering::SalesAsc => "p.sales_count ASC, p.created_at DESC",
            ProductOrdering::SalesDesc => "p.sales_count DESC, p.created_at DESC",
        }
    }
}

impl FromStr for ProductOrdering {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "price" => Ok(ProductOrdering::PriceAsc),
            "-price" => Ok(ProductOrdering::PriceDesc),
            "created_at" => Ok(ProductOrdering::CreatedAsc),
            "-created_at" => Ok(ProductOrdering::CreatedDesc),
            "sales_count" => Ok(ProductOrdering::SalesAsc),
            "-sales_count" => Ok(ProductOrdering::SalesDesc),
            _ => Err(crate::error::ValidationError::NotAllowed {
                field: "ordering".to_string(),
                allowed: ["price", "created_at", "sales_count"]
                    .iter()
                    .flat_map(|f| [f.to_string(), format!("-{}", f)])
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
