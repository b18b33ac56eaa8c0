//! StyleYoung storefront server entry point.
//!
//! ```text
//! init_tracing ──► AppConfig::load ──► Database (migrations) ──► WeatherClient
//!        │
//!        ▼
//!   axum::serve(0.0.0.0:8000) ── Ctrl+C / SIGTERM ──► drain ──► close pool
//! ```

use std::sync::Arc;

use anyhow::Context;
use styleyoung_db::{Database, DbConfig};
use styleyoung_weather::WeatherClient;
use tokio::net::TcpListener;
use tracing::{info, warn};

use storefront_api::auth::JwtManager;
use storefront_api::config::AppConfig;
use storefront_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    storefront_api::init_tracing();

    info!("Starting StyleYoung storefront API...");

    let config = AppConfig::load().context("Invalid configuration")?;
    info!(
        addr = %config.bind_addr,
        db = %config.db_path,
        weather = config.weather_api_key.is_some(),
        "Configuration loaded"
    );

    let db = Database::new(DbConfig::new(&config.db_path).max_connections(config.db_max_connections))
        .await
        .with_context(|| format!("Failed to open database at {}", config.db_path))?;
    info!("Database ready");

    let weather = WeatherClient::new(config.weather_config()).context("Failed to build weather client")?;
    let jwt = JwtManager::new(config.jwt_secret.clone(), config.jwt_lifetime_secs);

    let state = Arc::new(AppState::new(db.clone(), jwt, weather));
    let app = storefront_api::app(state, config.cors_permissive);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
