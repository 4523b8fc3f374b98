use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use hotel_assistant::GeminiConfig;
use hotel_core::{load_catalog, RoomCatalog};

const DEFAULT_ORIGINS: [&str; 4] = [
    "http://localhost:5173",
    "http://127.0.0.1:5173",
    "http://localhost:3000",
    "http://127.0.0.1:3000",
];

/// Runtime settings read from `HOTEL_*` environment variables.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub database_url: Option<String>,
    pub catalog: RoomCatalog,
    pub gemini: Option<GeminiConfig>,
    pub allowed_origins: Vec<String>,
    pub rate_limit_window: Duration,
    pub rate_limit_max: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            catalog: RoomCatalog::default(),
            gemini: None,
            allowed_origins: DEFAULT_ORIGINS.iter().map(|v| v.to_string()).collect(),
            rate_limit_window: Duration::from_secs(60),
            rate_limit_max: 120,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let catalog = match non_empty_var("HOTEL_CATALOG_PATH") {
            Some(path) => load_catalog(&path).context("invalid HOTEL_CATALOG_PATH")?,
            None => defaults.catalog,
        };

        let gemini = GeminiConfig::from_env();

        let allowed_origins = non_empty_var("HOTEL_ALLOWED_ORIGINS")
            .map(|value| parse_origins(&value))
            .unwrap_or(defaults.allowed_origins);

        let rate_limit_window = Duration::from_secs(
            parsed_var("HOTEL_RATE_LIMIT_WINDOW_SECONDS")
                .unwrap_or(defaults.rate_limit_window.as_secs()),
        );
        let rate_limit_max = parsed_var("HOTEL_RATE_LIMIT_MAX").unwrap_or(defaults.rate_limit_max);

        Ok(Self {
            database_url: non_empty_var("HOTEL_DATABASE_URL"),
            catalog,
            gemini,
            allowed_origins,
            rate_limit_window,
            rate_limit_max,
        })
    }
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parsed_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.trim().parse().ok())
}
