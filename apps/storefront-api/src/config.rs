//! Storefront API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::net::SocketAddr;

use styleyoung_weather::{WeatherConfig, DEFAULT_BASE_URL, DEFAULT_CITY};

/// Storefront API configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen address
    pub bind_addr: SocketAddr,

    /// SQLite database file
    pub db_path: String,

    /// Pool size
    pub db_max_connections: u32,

    /// JWT secret key for signing tokens
    pub jwt_secret: String,

    /// Session token lifetime in seconds
    pub jwt_lifetime_secs: i64,

    /// OpenWeatherMap key (weather widget disabled when unset)
    pub weather_api_key: Option<String>,

    /// City queried by the weather widget
    pub weather_city: String,

    /// Weather endpoint (overridable for tests and proxies)
    pub weather_base_url: String,

    /// Allow any origin (local frontend development)
    pub cors_permissive: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let config = AppConfig {
            bind_addr: var("STYLEYOUNG_BIND_ADDR", "0.0.0.0:8000")
                .parse()
                .map_err(|_| ConfigError::InvalidValue("STYLEYOUNG_BIND_ADDR".to_string()))?,

            db_path: var("STYLEYOUNG_DB_PATH", "./styleyoung.db"),

            db_max_connections: var("STYLEYOUNG_DB_MAX_CONNECTIONS", "5")
                .parse()
                .map_err(|_| {
                    ConfigError::InvalidValue("STYLEYOUNG_DB_MAX_CONNECTIONS".to_string())
                })?,

            // In production this MUST be set via environment variable
            jwt_secret: var("JWT_SECRET", "styleyoung-dev-secret-change-in-production"),

            jwt_lifetime_secs: var("JWT_LIFETIME_SECS", "86400") // 1 day
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()))?,

            weather_api_key: lookup("OPENWEATHER_API_KEY").filter(|key| !key.trim().is_empty()),

            weather_city: var("WEATHER_CITY", DEFAULT_CITY),

            weather_base_url: var("WEATHER_BASE_URL", DEFAULT_BASE_URL),

            cors_permissive: match var("STYLEYOUNG_CORS_PERMISSIVE", "false").as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                _ => {
                    return Err(ConfigError::InvalidValue(
                        "STYLEYOUNG_CORS_PERMISSIVE".to_string(),
                    ))
                }
            },
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "STYLEYOUNG_DB_MAX_CONNECTIONS".to_string(),
            ));
        }
        if config.jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()));
        }

        Ok(config)
    }

    /// Settings for the weather widget client.
    pub fn weather_config(&self) -> WeatherConfig {
        WeatherConfig::new(self.weather_api_key.clone())
            .with_city(self.weather_city.clone())
            .with_base_url(self.weather_base_url.clone())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
