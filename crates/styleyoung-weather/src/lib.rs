//! # StyleYoung Weather
//!
//! Current-conditions widget backed by the OpenWeatherMap "current weather"
//! endpoint, with a small in-process cache so page views never hammer the
//! upstream API.
//!
//! ## Request Flow
//! ```text
//! current()
//!    │
//!    ├── no API key ─────────────────────────────► None
//!    │
//!    ├── cache hit (not expired) ────────────────► cached Weather
//!    │
//!    └── GET {base_url}?q=city&units=metric&lang=es   (5s timeout)
//!           │
//!           ├── 200 ──────────────► Live        (cache 2h)
//!           ├── 429 ── sleep ── retry
//!           │              └─ 429 ► Fallback    (cache 1h)
//!           ├── other status ─────► Unavailable (no cache)
//!           └── timeout/connect ──► None
//! ```

use std::time::{Duration, Instant};

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

// =============================================================================
// Constants
// =============================================================================

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_CITY: &str = "Medellin,CO";

/// Text shown when there is no reading at all.
pub const UNAVAILABLE_TEXT: &str = "Clima no disponible";

const MAX_ATTEMPTS: u32 = 2;

// Default reading used while rate limited
const DEFAULT_TEMPERATURE: f64 = 24.0;
const DEFAULT_DESCRIPTION: &str = "Clima despejado";
const DEFAULT_ICON: &str = "01d";
const DEFAULT_HUMIDITY: i64 = 65;
const DEFAULT_FEELS_LIKE: f64 = 25.0;

// =============================================================================
// Configuration
// =============================================================================

/// Weather client settings.
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    /// OpenWeatherMap key. The widget is disabled without one.
    pub api_key: Option<String>,

    /// `q` parameter, e.g. "Medellin,CO".
    pub city: String,

    /// Full endpoint URL.
    pub base_url: String,

    pub timeout: Duration,

    /// Pause before retrying after a 429.
    pub retry_delay: Duration,

    pub live_ttl: Duration,
    pub fallback_ttl: Duration,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        WeatherConfig {
            api_key: None,
            city: DEFAULT_CITY.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(5),
            retry_delay: Duration::from_secs(2),
            live_ttl: Duration::from_secs(2 * 60 * 60),
            fallback_ttl: Duration::from_secs(60 * 60),
        }
    }
}

impl WeatherConfig {
    pub fn new(api_key: Option<String>) -> Self {
        WeatherConfig {
            api_key,
            ..Default::default()
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// "Medellin,CO" → "Medellin"
    fn city_name(&self) -> &str {
        self.city.split(',').next().unwrap_or(&self.city).trim()
    }
}

// =============================================================================
// Weather Payload
// =============================================================================

/// Where a reading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherSource {
    Live,
    Fallback,
    Unavailable,
}

/// A weather reading for the storefront header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub city: String,
    /// °C, one decimal.
    pub temperature: f64,
    pub description: String,
    pub icon: String,
    pub icon_url: String,
    pub humidity: i64,
    pub feels_like: f64,
    pub source: WeatherSource,
}

impl Weather {
    fn placeholder(city: &str, description: &str, source: WeatherSource) -> Self {
        Weather {
            city: city.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            description: description.to_string(),
            icon: DEFAULT_ICON.to_string(),
            icon_url: icon_url(DEFAULT_ICON),
            humidity: DEFAULT_HUMIDITY,
            feels_like: DEFAULT_FEELS_LIKE,
            source,
        }
    }

    /// Reading served while the upstream API is rate limiting us.
    pub fn fallback(city: &str) -> Self {
        Self::placeholder(city, DEFAULT_DESCRIPTION, WeatherSource::Fallback)
    }

    /// Reading served when the upstream API answered with an error.
    pub fn unavailable(city: &str) -> Self {
        Self::placeholder(city, UNAVAILABLE_TEXT, WeatherSource::Unavailable)
    }
}

/// One-line summary: "24°C - Clima despejado".
pub fn format_short(weather: &Weather) -> String {
    format!("{:.0}°C - {}", weather.temperature, weather.description)
}

fn icon_url(icon: &str) -> String {
    format!("https://openweathermap.org/img/wn/{}@2x.png", icon)
}

// =============================================================================
// Upstream Response
// =============================================================================

#[derive(Debug, Deserialize)]
struct ApiResponse {
    main: ApiMain,
    weather: Vec<ApiCondition>,
}

#[derive(Debug, Deserialize)]
struct ApiMain {
    temp: f64,
    feels_like: f64,
    humidity: i64,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    description: String,
    icon: String,
}

impl ApiResponse {
    fn into_weather(self, city: &str) -> Result<Weather, WeatherError> {
        let condition = self
            .weather
            .into_iter()
            .next()
            .ok_or(WeatherError::MissingCondition)?;

        Ok(Weather {
            city: city.to_string(),
            temperature: round1(self.main.temp),
            description: capitalize(&condition.description),
            icon_url: icon_url(&condition.icon),
            icon: condition.icon,
            humidity: self.main.humidity,
            feels_like: round1(self.main.feels_like),
            source: WeatherSource::Live,
        })
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// "nubes dispersas" → "Nubes dispersas"
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// =============================================================================
// Client
// =============================================================================

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Response had no weather condition")]
    MissingCondition,
}

/// Outcome of talking to the upstream API.
enum Fetched {
    Live(Weather),
    RateLimited,
    Status(StatusCode),
}

struct CachedWeather {
    weather: Weather,
    expires_at: Instant,
}

/// Cached OpenWeatherMap client, shared across requests.
pub struct WeatherClient {
    http: reqwest::Client,
    config: WeatherConfig,
    cache: RwLock<Option<CachedWeather>>,
}

impl WeatherClient {
    pub fn new(config: WeatherConfig) -> Result<Self, WeatherError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        if config.api_key.is_none() {
            info!("No weather API key configured; weather widget disabled");
        }

        Ok(WeatherClient {
            http,
            config,
            cache: RwLock::new(None),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Current reading, or `None` when the widget should be hidden.
    pub async fn current(&self) -> Option<Weather> {
        let api_key = self.config.api_key.as_deref()?;

        if let Some(weather) = self.cached().await {
            debug!(source = ?weather.source, "Weather cache hit");
            return Some(weather);
        }

        let city = self.config.city_name();

        match self.fetch(api_key).await {
            Ok(Fetched::Live(weather)) => {
                self.store(&weather, self.config.live_ttl).await;
                Some(weather)
            }
            Ok(Fetched::RateLimited) => {
                warn!("Weather API rate limit reached; serving default reading");
                let weather = Weather::fallback(city);
                self.store(&weather, self.config.fallback_ttl).await;
                Some(weather)
            }
            Ok(Fetched::Status(status)) => {
                warn!(status = %status, "Weather API returned an error status");
                Some(Weather::unavailable(city))
            }
            Err(e) => {
                warn!(error = %e, "Weather API request failed");
                None
            }
        }
    }

    async fn fetch(&self, api_key: &str) -> Result<Fetched, WeatherError> {
        let city = self.config.city_name();

        for attempt in 1..=MAX_ATTEMPTS {
            let response = self
                .http
                .get(&self.config.base_url)
                .query(&[
                    ("q", self.config.city.as_str()),
                    ("appid", api_key),
                    ("units", "metric"),
                    ("lang", "es"),
                ])
                .send()
                .await?;

            match response.status() {
                status if status.is_success() => {
                    let body: ApiResponse = response.json().await?;
                    return Ok(Fetched::Live(body.into_weather(city)?));
                }
                StatusCode::TOO_MANY_REQUESTS if attempt < MAX_ATTEMPTS => {
                    debug!(attempt, "Weather API rate limited; retrying");
                    tokio::time::sleep(self.config.retry_delay).await;
                }
                StatusCode::TOO_MANY_REQUESTS => return Ok(Fetched::RateLimited),
                status => return Ok(Fetched::Status(status)),
            }
        }

        Ok(Fetched::RateLimited)
    }

    async fn cached(&self) -> Option<Weather> {
        let cache = self.cache.read().await;
        cache
            .as_ref()
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.weather.clone())
    }

    async fn store(&self, weather: &Weather, ttl: Duration) {
        *self.cache.write().await = Some(CachedWeather {
            weather: weather.clone(),
            expires_at: Instant::now() + ttl,
        });
    }
}
