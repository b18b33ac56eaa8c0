//! # Cart Routes
//!
//! Every signed-in user has exactly one active cart, created on first use.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌──────────┐  POST /cart/lines   ┌──────────┐  POST /checkout  ┌──────────┐
//! │  Empty   │────────────────────►│ In Cart  │─────────────────►│  Order   │
//! │  Cart    │◄────────────────────│          │                  │ (cart    │
//! └──────────┘    DELETE /cart     └──────────┘                  │ retired) │
//!                                    │      ▲                    └──────────┘
//!                   PUT/DELETE       │      │
//!                   /cart/lines/{id} └──────┘
//! ```
//!
//! Each mutation answers with the whole cart, total recomputed.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use styleyoung_core::CartView;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddLineRequest {
    pub product_id: String,
    pub size_id: String,
    #[serde(default = "one")]
    pub quantity: i64,
}

fn one() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateLineRequest {
    pub quantity: i64,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cart", get(view_cart).delete(clear_cart))
        .route("/cart/lines", post(add_line))
        .route("/cart/lines/{line_id}", put(update_line).delete(remove_line))
}

async fn view_cart(State(state): State<Arc<AppState>>, user: AuthUser) -> ApiResult<Json<CartView>> {
    let carts = state.db.carts();
    let cart = carts.active_for_user(user.id()).await?;
    Ok(Json(carts.view(&cart.id).await?))
}

async fn add_line(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<AddLineRequest>,
) -> ApiResult<Json<CartView>> {
    let carts = state.db.carts();
    let cart = carts.active_for_user(user.id()).await?;
    let view = carts
        .add_line(&cart.id, &req.product_id, &req.size_id, req.quantity)
        .await?;
    Ok(Json(view))
}

async fn update_line(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(line_id): Path<String>,
    Json(req): Json<UpdateLineRequest>,
) -> ApiResult<Json<CartView>> {
    let carts = state.db.carts();
    let cart = carts.active_for_user(user.id()).await?;
    let view = carts
        .update_line_quantity(&cart.id, &line_id, req.quantity)
        .await?;
    Ok(Json(view))
}

async fn remove_line(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(line_id): Path<String>,
) -> ApiResult<Json<CartView>> {
    let carts = state.db.carts();
    let cart = carts.active_for_user(user.id()).await?;
    Ok(Json(carts.remove_line(&cart.id, &line_id).await?))
}

async fn clear_cart(State(state): State<Arc<AppState>>, user: AuthUser) -> ApiResult<Json<CartView>> {
    let carts = state.db.carts();
    let cart = carts.active_for_user(user.id()).await?;
    Ok(Json(carts.clear(&cart.id).await?))
}
