//! Configuration for the trend collector.
//!
//! Settings come from three layers: built-in defaults, an optional JSON file,
//! and command-line flags (applied by the runner). Every field has a default,
//! so an empty object is a valid file.
//!
//! # Example config
//!
//! ```json
//! {
//!   "influx": { "addr": "http://localhost:8086", "database": "crypto" },
//!   "quotes": { "symbol": "bitcoin", "convert": "eur" },
//!   "collect": { "interval_secs": 300 }
//! }
//! ```

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::{Result, TrendError};
use crate::types::{BatchConfig, Currency, Precision};

/// Default destination address.
pub const DEFAULT_INFLUX_ADDR: &str = "https://influx.skapa.xyz";
/// Default quote API root.
pub const DEFAULT_QUOTES_URL: &str = "https://api.coinmarketcap.com";
/// The quote API refreshes its figures every five minutes.
pub const DEFAULT_INTERVAL_SECS: u64 = 300;
/// Longest accepted interval (one week).
pub const MAX_INTERVAL_SECS: u64 = 7 * 24 * 60 * 60;

/// Top-level application config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub influx: InfluxConfig,
    pub quotes: QuotesConfig,
    pub collect: CollectConfig,
}

/// Time-series database destination.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InfluxConfig {
    pub addr: String,
    pub database: String,
    pub username: String,
    pub password: String,
    pub precision: Precision,
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_INFLUX_ADDR.into(),
            database: "crypto".into(),
            username: String::new(),
            password: String::new(),
            precision: Precision::Seconds,
        }
    }
}

impl InfluxConfig {
    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig { database: self.database.clone(), precision: self.precision }
    }
}

/// Quote API selection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuotesConfig {
    pub base_url: String,
    /// Currency to track. Empty tracks every listed currency.
    pub symbol: String,
    /// Conversion currency added next to USD/BTC. Empty adds none.
    pub convert: String,
}

impl Default for QuotesConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_QUOTES_URL.into(), symbol: String::new(), convert: "aud".into() }
    }
}

/// Collection cadence.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectConfig {
    pub interval_secs: u64,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self { interval_secs: DEFAULT_INTERVAL_SECS }
    }
}

impl CollectConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl AppConfig {
    /// Reject settings that would make every collection cycle fail.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.influx.addr)
            .map_err(|e| TrendError::Config(format!("invalid influx address '{}': {e}", self.influx.addr)))?;
        Url::parse(&self.quotes.base_url)
            .map_err(|e| TrendError::Config(format!("invalid quotes url '{}': {e}", self.quotes.base_url)))?;
        if self.influx.database.trim().is_empty() {
            return Err(TrendError::Config("database name must not be empty".into()));
        }
        if self.collect.interval_secs == 0 {
            return Err(TrendError::Config("interval_secs must be positive".into()));
        }
        if self.collect.interval_secs > MAX_INTERVAL_SECS {
            return Err(TrendError::Config(format!(
                "interval_secs {} exceeds the maximum of {MAX_INTERVAL_SECS}",
                self.collect.interval_secs
            )));
        }
        if !self.quotes.convert.is_empty() {
            Currency::from_code(&self.quotes.convert)?;
        }
        Ok(())
    }
}

/// Load and parse a JSON config file.
pub fn load_config(path: &std::path::Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| TrendError::Config(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&content).map_err(|e| TrendError::Config(format!("{}: {e}", path.display())))
}
