//! # Checkout and Order History
//!
//! ```text
//! POST /api/checkout { "address": "Calle 10 # 43-12" }
//!        │  missing or blank address ──► 400, nothing written
//!        ▼
//!   OrderRepository::checkout  (one transaction)
//!        ├── re-check every line against current stock
//!        ├── freeze unit prices into order lines
//!        ├── take stock from each size
//!        └── retire the cart
//!        │
//!        ▼
//!   201 OrderWithLines (status "processing")
//! ```
//!
//! A customer only ever sees their own orders. Someone else's order id
//! answers 404, exactly like an unknown one.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use styleyoung_core::OrderWithLines;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CheckoutRequest {
    /// Shipping address for this order. Required.
    #[serde(default)]
    pub address: Option<String>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/checkout", post(checkout))
        .route("/orders", get(list_orders))
        .route("/orders/{id}", get(get_order))
}

async fn checkout(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<CheckoutRequest>,
) -> ApiResult<(StatusCode, Json<OrderWithLines>)> {
    let address = req
        .address
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| ApiError::validation("A shipping address is required"))?;

    let order = state.db.orders().checkout(user.id(), &address).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<Json<Vec<OrderWithLines>>> {
    Ok(Json(state.db.orders().list_for_user(user.id()).await?))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<OrderWithLines>> {
    state
        .db
        .orders()
        .get_for_user(user.id(), &id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Order", &id))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support;
    use axum::http::StatusCode;
    use serde_json::json;

    const ADDRESS: &str = "Calle 10 # 43-12";

    #[tokio::test]
    async fn test_checkout_freezes_prices_and_takes_stock() {
        let app = test_support::app().await;
        let token = app.customer("laura").await;
        let (camiseta, m) = app.product("Camiseta Básica", 4_500_000, 10).await;

        app.post(
            "/api/cart/lines",
            Some(&token),
            json!({ "product_id": camiseta.id, "size_id": m.id, "quantity": 2 }),
        )
        .await;

        let (status, body) = app
            .post("/api/checkout", Some(&token), json!({ "address": "Cra 43A # 1-50" }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        assert_eq!(body["total_cents"], 9_000_000);
        assert_eq!(body["status"], "processing");
        assert_eq!(body["address"], "Cra 43A # 1-50");
        assert_eq!(body["lines"][0]["unit_price_cents"], 4_500_000);
        assert_eq!(body["lines"][0]["quantity"], 2);

        let size = app.state.db.sizes().get_by_id(&m.id).await.unwrap().unwrap();
        assert_eq!(size.stock, 8);

        // The retired cart is replaced by a fresh, empty one
        let (_, cart) = app.get("/api/cart", Some(&token)).await;
        assert!(cart["lines"].as_array().unwrap().is_empty());
        assert_eq!(cart["total_cents"], 0);

        let (_, orders) = app.get("/api/orders", Some(&token)).await;
        assert_eq!(orders.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_checkout_without_address_rejected() {
        let app = test_support::app().await;
        let token = app.customer("laura").await;
        let (camiseta, m) = app.product("Camiseta Básica", 4_500_000, 10).await;

        app.post(
            "/api/cart/lines",
            Some(&token),
            json!({ "product_id": camiseta.id, "size_id": m.id }),
        )
        .await;

        for body in [json!({}), json!({ "address": "   " })] {
            let (status, body) = app.post("/api/checkout", Some(&token), body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["code"], "VALIDATION_ERROR");
        }

        assert_eq!(app.state.db.orders().count().await.unwrap(), 0);
        let size = app.state.db.sizes().get_by_id(&m.id).await.unwrap().unwrap();
        assert_eq!(size.stock, 10);
        let (_, cart) = app.get("/api/cart", Some(&token)).await;
        assert_eq!(cart["lines"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_cart_checkout_rejected() {
        let app = test_support::app().await;
        let token = app.customer("laura").await;

        let (status, body) = app.post("/api/checkout", Some(&token), json!({ "address": ADDRESS })).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "EMPTY_CART");
    }

    #[tokio::test]
    async fn test_oversold_checkout_rolls_back() {
        let app = test_support::app().await;
        let laura = app.customer("laura").await;
        let pedro = app.customer("pedro").await;
        let (jean, m) = app.product("Jean Slim", 12_000_000, 3).await;

        for token in [&laura, &pedro] {
            let (status, _) = app
                .post(
                    "/api/cart/lines",
                    Some(token),
                    json!({ "product_id": jean.id, "size_id": m.id, "quantity": 2 }),
                )
                .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, _) = app.post("/api/checkout", Some(&laura), json!({ "address": ADDRESS })).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = app.post("/api/checkout", Some(&pedro), json!({ "address": ADDRESS })).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "INSUFFICIENT_STOCK");

        let size = app.state.db.sizes().get_by_id(&m.id).await.unwrap().unwrap();
        assert_eq!(size.stock, 1);

        // Pedro keeps his cart
        let (_, cart) = app.get("/api/cart", Some(&pedro)).await;
        assert_eq!(cart["lines"][0]["quantity"], 2);
    }

    #[tokio::test]
    async fn test_orders_are_private() {
        let app = test_support::app().await;
        let laura = app.customer("laura").await;
        let pedro = app.customer("pedro").await;
        let (camiseta, m) = app.product("Camiseta Básica", 4_500_000, 10).await;

        app.post(
            "/api/cart/lines",
            Some(&laura),
            json!({ "product_id": camiseta.id, "size_id": m.id }),
        )
        .await;
        let (_, order) = app.post("/api/checkout", Some(&laura), json!({ "address": ADDRESS })).await;
        let uri = format!("/api/orders/{}", order["id"].as_str().unwrap());

        let (status, body) = app.get(&uri, Some(&laura)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["lines"].as_array().unwrap().len(), 1);

        let (status, _) = app.get(&uri, Some(&pedro)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, orders) = app.get("/api/orders", Some(&pedro)).await;
        assert!(orders.as_array().unwrap().is_empty());
    }
}
