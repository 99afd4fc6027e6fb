//! CoinMarketCap ticker client.
//!
//! | Operation  | Method | Path                                   |
//! |------------|--------|----------------------------------------|
//! | One ticker | GET    | `/v1/ticker/{id}/[?convert={c}]`       |
//! | All        | GET    | `/v1/ticker/?limit=0[&convert={c}]`    |
//!
//! Both endpoints answer with a JSON array; see [`json_parser`] for the
//! payload shape.

pub mod json_parser;

use async_trait::async_trait;
use tracing::debug;
use trend_core::{Result, Tick, TrendError};

use crate::QuoteSource;

/// HTTP client for the public ticker API.
pub struct CoinMarketCapClient {
    http: reqwest::Client,
    base_url: String,
}

impl CoinMarketCapClient {
    /// Create a client rooted at `base_url` (e.g. `https://api.coinmarketcap.com`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http: reqwest::Client::new(), base_url }
    }

    /// URL of the single-currency ticker.
    pub fn ticker_url(&self, symbol: &str, convert: &str) -> String {
        let mut url = format!("{}/v1/ticker/{}/", self.base_url, urlencoding::encode(symbol));
        if !convert.is_empty() {
            url.push_str("?convert=");
            url.push_str(&urlencoding::encode(convert));
        }
        url
    }

    /// URL of the all-currencies ticker.
    pub fn ticker_all_url(&self, convert: &str) -> String {
        let mut url = format!("{}/v1/ticker/?limit=0", self.base_url);
        if !convert.is_empty() {
            url.push_str("&convert=");
            url.push_str(&urlencoding::encode(convert));
        }
        url
    }

    async fn get_ticks(&self, url: &str) -> Result<Vec<Tick>> {
        debug!("GET {url}");
        let body = self.http.get(url).send().await?.error_for_status()?.text().await?;
        json_parser::parse_ticker_array(&body)
    }
}

#[async_trait]
impl QuoteSource for CoinMarketCapClient {
    async fn fetch_one(&self, symbol: &str, convert: &str) -> Result<Tick> {
        if symbol.is_empty() {
            return Err(TrendError::Config("crypto currency not specified".into()));
        }
        let url = self.ticker_url(symbol, convert);
        let ticks = self.get_ticks(&url).await?;
        ticks.into_iter().next().ok_or(TrendError::EmptyResponse(url))
    }

    async fn fetch_all(&self, convert: &str) -> Result<Vec<Tick>> {
        let url = self.ticker_all_url(convert);
        self.get_ticks(&url).await
    }
}
