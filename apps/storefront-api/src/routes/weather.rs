//! Current weather for the storefront header.
//!
//! Never fails: without an API key, or when the provider is down and
//! nothing is cached, `weather` is null and `summary` carries the
//! "unavailable" text.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use styleyoung_weather::{format_short, Weather, UNAVAILABLE_TEXT};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WeatherResponse {
    pub weather: Option<Weather>,
    pub summary: String,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/weather", get(current_weather))
}

async fn current_weather(State(state): State<Arc<AppState>>) -> Json<WeatherResponse> {
    let weather = state.weather.current().await;
    let summary = weather
        .as_ref()
        .map(format_short)
        .unwrap_or_else(|| UNAVAILABLE_TEXT.to_string());

    Json(WeatherResponse { weather, summary })
}
