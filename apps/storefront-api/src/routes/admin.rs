//! # Staff Back Office
//!
//! Catalog maintenance, order handling and the dashboard. Every handler
//! takes an [`AdminUser`], which re-reads the account and answers 403 for
//! anyone without the staff flag.
//!
//! ## Order Status Side Effects
//! ```text
//! PUT /api/admin/orders/{id}/status { "status": "delivered" }
//!        │
//!        ▼
//!   entering or leaving "delivered"?
//!        │ yes                          │ no
//!        ▼                              ▼
//!   recompute sales_count of the     status only
//!   order's products (same tx)
//! ```

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use styleyoung_core::input::{CategoryInput, ImageInput, ProductInput, SizeInput};
use styleyoung_core::{
    Category, DashboardSummary, Order, OrderStatus, OrderWithLines, Product, ProductImage,
    SalesReport, Size,
};
use styleyoung_db::OrderStatusChange;
use tracing::info;

use crate::auth::AdminUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// =============================================================================
// Payloads
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct StockUpdate {
    pub stock: i64,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderListParams {
    #[serde(default)]
    pub status: Option<String>,
}

impl OrderListParams {
    /// Blank means "every status".
    pub fn status(&self) -> ApiResult<Option<OrderStatus>> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => Ok(Some(raw.parse::<OrderStatus>()?)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CounterRefresh {
    pub success: bool,
    pub products_updated: u64,
    pub message: String,
}

// =============================================================================
// Router
// =============================================================================

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/sales-report", get(sales_report))
        .route("/sales-counters/refresh", post(refresh_sales_counters))
        .route("/categories", post(create_category))
        .route("/categories/{id}", put(update_category).delete(delete_category))
        .route("/products", post(create_product))
        .route("/products/{id}", put(update_product).delete(delete_product))
        .route("/products/{id}/sizes", get(list_sizes).post(create_size))
        .route("/sizes/{id}", put(set_stock).delete(delete_size))
        .route("/products/{id}/images", get(list_images).post(create_image))
        .route("/images/{id}/primary", post(make_primary))
        .route("/images/{id}", delete(delete_image))
        .route("/orders", get(list_orders))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", put(update_order_status))
}

// =============================================================================
// Dashboard
// =============================================================================

async fn dashboard(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> ApiResult<Json<DashboardSummary>> {
    Ok(Json(state.db.reports().dashboard().await?))
}

async fn sales_report(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> ApiResult<Json<SalesReport>> {
    Ok(Json(state.db.reports().sales_report().await?))
}

async fn refresh_sales_counters(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
) -> ApiResult<Json<CounterRefresh>> {
    let products_updated = state.db.products().recompute_all_sales_counters().await?;

    info!(admin = %admin.id, products_updated, "Sales counters recomputed");

    Ok(Json(CounterRefresh {
        success: true,
        products_updated,
        message: format!("Se actualizaron {} productos", products_updated),
    }))
}

// =============================================================================
// Categories
// =============================================================================

async fn create_category(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(input): Json<CategoryInput>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let category = state.db.categories().insert(&input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(input): Json<CategoryInput>,
) -> ApiResult<Json<Category>> {
    Ok(Json(state.db.categories().update(&id, &input).await?))
}

async fn delete_category(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.categories().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Products, Sizes and Images
// =============================================================================

async fn create_product(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(input): Json<ProductInput>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = state.db.products().insert(&input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(input): Json<ProductInput>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.db.products().update(&id, &input).await?))
}

async fn delete_product(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.products().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_sizes(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(product_id): Path<String>,
) -> ApiResult<Json<Vec<Size>>> {
    Ok(Json(state.db.sizes().list_for_product(&product_id).await?))
}

async fn create_size(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(product_id): Path<String>,
    Json(input): Json<SizeInput>,
) -> ApiResult<(StatusCode, Json<Size>)> {
    let size = state.db.sizes().insert(&product_id, &input).await?;
    Ok((StatusCode::CREATED, Json(size)))
}

async fn set_stock(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(update): Json<StockUpdate>,
) -> ApiResult<Json<Size>> {
    Ok(Json(state.db.sizes().set_stock(&id, update.stock).await?))
}

async fn delete_size(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.sizes().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_images(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(product_id): Path<String>,
) -> ApiResult<Json<Vec<ProductImage>>> {
    Ok(Json(state.db.images().list_for_product(&product_id).await?))
}

async fn create_image(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(product_id): Path<String>,
    Json(input): Json<ImageInput>,
) -> ApiResult<(StatusCode, Json<ProductImage>)> {
    let image = state.db.images().insert(&product_id, &input).await?;
    Ok((StatusCode::CREATED, Json(image)))
}

async fn make_primary(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ProductImage>> {
    Ok(Json(state.db.images().set_primary(&id).await?))
}

async fn delete_image(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.images().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Orders
// =============================================================================

async fn list_orders(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<OrderListParams>,
) -> ApiResult<Json<Vec<Order>>> {
    let status = params.status()?;
    Ok(Json(state.db.orders().list_all(status).await?))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<OrderWithLines>> {
    state
        .db
        .orders()
        .get_with_lines(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Order", &id))
}

async fn update_order_status(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> ApiResult<Json<OrderStatusChange>> {
    let status: OrderStatus = update.status.parse()?;
    let change = state.db.orders().update_status(&id, status).await?;

    info!(admin = %admin.id, order_id = %id, status = %status, "Order status set by staff");

    Ok(Json(change))
}
