//! Shared application state.

use styleyoung_db::Database;
use styleyoung_weather::WeatherClient;

use crate::auth::JwtManager;

/// Everything handlers share, wrapped in an `Arc` by the router.
pub struct AppState {
    pub db: Database,
    pub jwt: JwtManager,
    pub weather: WeatherClient,
}

impl AppState {
    pub fn new(db: Database, jwt: JwtManager, weather: WeatherClient) -> Self {
        AppState { db, jwt, weather }
    }
}
