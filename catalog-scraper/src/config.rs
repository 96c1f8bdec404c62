use catalog_core::{CatalogError, Result};
use std::env;
use std::time::Duration;

/// Environment-driven configuration, loaded once at startup and validated
/// eagerly so a bad deploy fails before the first scan rather than mid-run.
#[derive(Debug, Clone)]
pub struct Config {
    pub home_postcode: String,
    pub scan_schedule: String,
    pub scan_concurrency: usize,
    pub scan_timeout: Duration,
    pub http_rate_per_host: u32,
    pub log_level: String,
    pub geocoder_primary_url: String,
    pub geocoder_fallback_url: String,
    pub generic_extractor_url: Option<String>,
    pub generic_extractor_model: Option<String>,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| CatalogError::MissingField(format!("{key} could not be parsed"))),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let home_postcode = env::var("HOME_POSTCODE")
            .map_err(|_| CatalogError::MissingField("HOME_POSTCODE".to_string()))?;

        let scan_timeout_secs: u64 = env_parse("SCAN_TIMEOUT_SECONDS", 300)?;

        Ok(Self {
            home_postcode,
            scan_schedule: env_or("SCAN_SCHEDULE", "03:00"),
            scan_concurrency: env_parse("SCAN_CONCURRENCY", 1usize)?,
            scan_timeout: Duration::from_secs(scan_timeout_secs),
            http_rate_per_host: env_parse("HTTP_RATE_PER_HOST", 4u32)?,
            log_level: env_or("LOG_LEVEL", "info"),
            geocoder_primary_url: env_or(
                "GEOCODER_PRIMARY_URL",
                "https://api.postcodes.io/postcodes",
            ),
            geocoder_fallback_url: env_or(
                "GEOCODER_FALLBACK_URL",
                "https://api.postcodes.io/terminated_postcodes",
            ),
            generic_extractor_url: env::var("GENERIC_EXTRACTOR_URL").ok(),
            generic_extractor_model: env::var("GENERIC_EXTRACTOR_MODEL").ok(),
        })
    }
}
