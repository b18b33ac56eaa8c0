//! # Routes
//!
//! ```text
//! Public
//!   GET    /health
//!   POST   /api/auth/register              POST /api/auth/login
//!   GET    /api/products                   ?category_id&brand&color&min_price_cents
//!                                          &max_price_cents&search&ordering
//!   GET    /api/products/search?q=         live search (≤10)
//!   GET    /api/products/in-stock          GET /api/products/stats
//!   GET    /api/products/top-selling       best sellers (≤10)
//!   GET    /api/products/{id}
//!   GET    /api/categories                 GET /api/categories/{id}
//!   GET    /api/weather
//!
//! Signed in (AuthUser)
//!   GET    /api/auth/me
//!   GET    /api/cart                       DELETE /api/cart
//!   POST   /api/cart/lines                 PUT|DELETE /api/cart/lines/{id}
//!   POST   /api/checkout
//!   GET    /api/orders                     GET /api/orders/{id}
//!
//! Staff (AdminUser), under /api/admin
//!   GET    /dashboard                      GET  /sales-report
//!   POST   /sales-counters/refresh
//!   POST   /categories                     PUT|DELETE /categories/{id}
//!   POST   /products                       PUT|DELETE /products/{id}
//!   GET|POST /products/{id}/sizes          PUT|DELETE /sizes/{id}
//!   GET|POST /products/{id}/images         DELETE /images/{id}
//!   POST   /images/{id}/primary
//!   GET    /orders?status=                 GET /orders/{id}
//!   PUT    /orders/{id}/status
//!   GET    /reports/{kind}?format=xlsx|pdf
//! ```

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod health;
pub mod orders;
pub mod reports;
pub mod weather;

/// Every route, before state is attached.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health::routes())
        .nest(
            "/api",
            Router::new()
                .merge(auth::routes())
                .merge(catalog::routes())
                .merge(cart::routes())
                .merge(orders::routes())
                .merge(weather::routes())
                .nest(
                    "/admin",
                    Router::new().merge(admin::routes()).merge(reports::routes()),
                ),
        )
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Request helpers for route tests.

    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use styleyoung_core::input::{CategoryInput, ProductInput, SizeInput};
    use styleyoung_core::{Product, Size, SizeLabel};
    use styleyoung_db::{Database, DbConfig};
    use styleyoung_weather::{WeatherClient, WeatherConfig};
    use tower::ServiceExt;

    use crate::auth::JwtManager;
    use crate::state::AppState;

    pub struct TestApp {
        pub router: Router,
        pub state: Arc<AppState>,
    }

    pub async fn app() -> TestApp {
        app_with_weather(WeatherClient::new(WeatherConfig::default()).unwrap()).await
    }

    pub async fn app_with_weather(weather: WeatherClient) -> TestApp {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let state = Arc::new(AppState::new(db, JwtManager::new("test-secret", 3600), weather));

        TestApp {
            router: crate::app(state.clone(), false),
            state,
        }
    }

    impl TestApp {
        pub async fn request(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let (status, _, bytes) = self.raw(method, uri, token, body).await;
            let json = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or(Value::Null)
            };
            (status, json)
        }

        pub async fn raw(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
            }
            let request = match body {
                Some(body) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let headers = response.headers().clone();
            let bytes = response
                .into_body()
                .collect()
                .await
                .unwrap()
                .to_bytes()
                .to_vec();
            (status, headers, bytes)
        }

        pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
            self.request(Method::GET, uri, token, None).await
        }

        pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
            self.request(Method::POST, uri, token, Some(body)).await
        }

        /// Registers `username` through the API and returns its token.
        pub async fn customer(&self, username: &str) -> String {
            let (status, body) = self
                .post(
                    "/api/auth/register",
                    None,
                    json!({
                        "username": username,
                        "email": format!("{}@example.com", username),
                        "full_name": "Cliente de Prueba",
                        "address": "Calle 10 # 43-12",
                        "phone": "300 123 4567",
                        "password": "camisetas2024",
                        "password_confirmation": "camisetas2024"
                    }),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{}", body);
            body["token"].as_str().unwrap().to_string()
        }

        /// A registered user promoted to staff.
        pub async fn admin(&self) -> String {
            let token = self.customer("admin").await;
            let user = self
                .state
                .db
                .users()
                .get_by_email("admin@example.com")
                .await
                .unwrap()
                .unwrap();
            self.state.db.users().set_staff(&user.id, true).await.unwrap();
            token
        }

        /// A category with one product that has a single size.
        pub async fn product(&self, name: &str, price_cents: i64, stock: i64) -> (Product, Size) {
            let db = &self.state.db;
            let category = match db
                .categories()
                .list_with_counts()
                .await
                .unwrap()
                .into_iter()
                .find(|c| c.name == "Ropa Casual")
            {
                Some(c) => c.id,
                None => {
                    db.categories()
                        .insert(&CategoryInput {
                            name: "Ropa Casual".to_string(),
                            description: None,
                        })
                        .await
                        .unwrap()
                        .id
                }
            };
            let product = db
                .products()
                .insert(&ProductInput {
                    category_id: category,
                    name: name.to_string(),
                    description: None,
                    price_cents,
                    brand: "UrbanStyle".to_string(),
                    color: "Negro".to_string(),
                    material: "Algodón".to_string(),
                })
                .await
                .unwrap();
            let size = db
                .sizes()
                .insert(&product.id, &SizeInput { label: SizeLabel::M, stock })
                .await
                .unwrap();
            (product, size)
        }
    }
}
