//! # StyleYoung Storefront API
//!
//! HTTP JSON API of the StyleYoung clothing shop: catalog browsing,
//! customer accounts, carts, checkout, order history, the staff back
//! office with spreadsheet/PDF exports, and the weather header widget.
//!
//! ## Request Flow
//! ```text
//! ┌────────┐   ┌─────────────┐   ┌──────────────┐   ┌───────────────────┐
//! │ Client │──►│ TraceLayer  │──►│ Router       │──►│ Handler           │
//! │        │   │ CorsLayer   │   │ /health      │   │  AuthUser /       │
//! │        │   └─────────────┘   │ /api/...     │   │  AdminUser        │
//! │        │                     │ /api/admin/..│   │       │           │
//! │        │◄── JSON / file ─────┴──────────────┘   │       ▼           │
//! └────────┘      or ApiError {code, message}       │  Database (sqlx)  │
//!                                                   └───────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`]: environment configuration
//! - [`error`]: API error type and status mapping
//! - [`auth`]: password hashing, JWT sessions, request extractors
//! - [`state`]: shared application state
//! - [`routes`]: every HTTP route

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use state::AppState;

/// Builds the complete application with middleware attached.
pub fn app(state: Arc<AppState>, cors_permissive: bool) -> Router {
    let router = routes::router()
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show all debug logs
/// - `RUST_LOG=styleyoung=trace` - Trace the shop crates only
/// - Default: INFO, with DEBUG for the shop crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,styleyoung=debug,storefront_api=debug,tower_http=info,sqlx=warn")
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
