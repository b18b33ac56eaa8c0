//! # Catalog Routes
//!
//! Public, read-only browsing: product listing with filters, detail pages,
//! search-as-you-type, the in-stock and best-seller feeds, and category pages.
//!
//! ```text
//! GET /api/products?category_id=..&brand=DenimCo&color=azul
//!                  &min_price_cents=5000000&max_price_cents=15000000
//!                  &search=jean&ordering=-price
//!        │
//!        ▼
//!   ProductFilter ──► ProductRepository::list ──► [ProductSummary]
//! ```

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use styleyoung_core::{CatalogStats, Category, CategoryWithCount, ProductDetail, ProductSummary};
use styleyoung_db::ProductFilter;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Size of the public best-seller feed.
const TOP_SELLING_LIMIT: u32 = 10;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct CategoryPage {
    pub category: Category,
    pub products: Vec<ProductSummary>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/search", get(live_search))
        .route("/products/in-stock", get(in_stock))
        .route("/products/stats", get(stats))
        .route("/products/top-selling", get(top_selling))
        .route("/products/{id}", get(product_detail))
        .route("/categories", get(list_categories))
        .route("/categories/{id}", get(category_page))
}

async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ProductFilter>,
) -> ApiResult<Json<Vec<ProductSummary>>> {
    Ok(Json(state.db.products().list(&filter).await?))
}

async fn live_search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<ProductSummary>>> {
    Ok(Json(state.db.products().live_search(&params.q).await?))
}

async fn in_stock(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<ProductSummary>>> {
    Ok(Json(state.db.products().in_stock().await?))
}

async fn top_selling(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<ProductSummary>>> {
    Ok(Json(state.db.products().top_selling(TOP_SELLING_LIMIT).await?))
}

async fn stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<CatalogStats>> {
    Ok(Json(state.db.products().stats().await?))
}

async fn product_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProductDetail>> {
    state
        .db
        .products()
        .get_detail(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product", &id))
}

async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<CategoryWithCount>>> {
    Ok(Json(state.db.categories().list_with_counts().await?))
}

async fn category_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<CategoryPage>> {
    let category = state
        .db
        .categories()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category", &id))?;

    let products = state
        .db
        .products()
        .list(&ProductFilter::for_category(id))
        .await?;

    Ok(Json(CategoryPage { category, products }))
}
