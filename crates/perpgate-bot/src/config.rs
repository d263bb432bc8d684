//! Application configuration.
//!
//! Settings come from a TOML file; credentials come from the
//! environment only, never from the file.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Exchange connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// REST endpoint base URL.
    #[serde(default = "default_rest_url")]
    pub rest_url: String,
    /// Use the exchange's simulated-trading (demo) environment.
    #[serde(default)]
    pub simulated: bool,
}

fn default_rest_url() -> String {
    "https://www.okx.com".to_string()
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            rest_url: default_rest_url(),
            simulated: false,
        }
    }
}

/// Cache configuration.
///
/// TTLs are short by design: they balance the exchange's rate limits
/// against staleness tolerance for price/position display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL for cached ticker prices (ms). Default: 3,000.
    #[serde(default = "default_price_ttl_ms")]
    pub price_ttl_ms: u64,
    /// TTL for the cached open-position list (ms). Default: 5,000.
    #[serde(default = "default_position_ttl_ms")]
    pub position_ttl_ms: u64,
    /// Maximum live entries per cache. Default: 500.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_price_ttl_ms() -> u64 {
    3_000
}

fn default_position_ttl_ms() -> u64 {
    5_000
}

fn default_max_entries() -> usize {
    500
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            price_ttl_ms: default_price_ttl_ms(),
            position_ttl_ms: default_position_ttl_ms(),
            max_entries: default_max_entries(),
        }
    }
}

impl CacheConfig {
    pub fn price_ttl(&self) -> Duration {
        Duration::from_millis(self.price_ttl_ms)
    }

    pub fn position_ttl(&self) -> Duration {
        Duration::from_millis(self.position_ttl_ms)
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    /// Coins to keep quoted in the heartbeat loop (e.g. ["BTC", "ETH"]).
    #[serde(default)]
    pub watch: Vec<String>,
    /// Heartbeat interval (ms). Default: 30,000.
    #[serde(default = "default_heartbeat_ms")]
    pub heartbeat_ms: u64,
}

fn default_heartbeat_ms() -> u64 {
    30_000
}

impl AppConfig {
    /// Load configuration from file, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &str) -> AppResult<Self> {
        if Path::new(path).exists() {
            Self::from_file(path)
        } else {
            tracing::warn!(path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    pub fn heartbeat(&self) -> Duration {
        Duration::from_millis(self.heartbeat_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.cache.price_ttl_ms, 3_000);
        assert_eq!(config.cache.position_ttl_ms, 5_000);
        assert_eq!(config.cache.max_entries, 500);
        assert!(!config.exchange.simulated);
        assert!(config.watch.is_empty());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            watch = ["BTC", "ETH"]

            [exchange]
            simulated = true

            [cache]
            price_ttl_ms = 1000
            "#,
        )
        .unwrap();

        assert!(config.exchange.simulated);
        assert_eq!(config.exchange.rest_url, "https://www.okx.com");
        assert_eq!(config.cache.price_ttl_ms, 1000);
        // Unspecified fields keep their defaults.
        assert_eq!(config.cache.position_ttl_ms, 5_000);
        assert_eq!(config.watch, vec!["BTC", "ETH"]);
    }

    #[test]
    fn test_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.heartbeat_ms, config.heartbeat_ms);
    }
}
