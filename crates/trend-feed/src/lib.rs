//! # trend-feed
//!
//! Quote retrieval and the periodic collection loop.
//!
//! ## Architecture
//!
//! ```text
//! interval tick ──► Collector ──► QuoteSource::fetch_* ──► Tick ──► mpsc ──► (persister)
//! ```
//!
//! - [`coinmarketcap`]: HTTP ticker client implementing [`QuoteSource`]
//! - [`collector`]: timer-driven loop forwarding ticks downstream
//! - [`json_util`]: JSON parsing helpers

pub mod coinmarketcap;
pub mod collector;
pub mod json_util;

use async_trait::async_trait;
use trend_core::{Result, Tick};

/// A source of market snapshots.
///
/// Calls are not retried and carry no timeout of their own; a failing call
/// is reported to the caller unchanged.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the snapshot of one currency, optionally converted to `convert`.
    async fn fetch_one(&self, symbol: &str, convert: &str) -> Result<Tick>;

    /// Fetch snapshots of every listed currency.
    async fn fetch_all(&self, convert: &str) -> Result<Vec<Tick>>;
}
