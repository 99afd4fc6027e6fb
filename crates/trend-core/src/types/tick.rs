//! Market snapshot of one cryptocurrency.

use chrono::{DateTime, Utc};

use super::currency::{Currency, CurrencyValues, Metric};

/// One fetched snapshot of a currency's market data.
///
/// Constructed fresh from each quote response and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// API identifier, e.g. `"bitcoin"`. Becomes the point measurement.
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub rank: u32,
    pub available_supply: Option<f64>,
    pub total_supply: Option<f64>,
    pub max_supply: Option<f64>,
    pub last_updated: DateTime<Utc>,
    pub price: CurrencyValues,
    pub volume_24h: CurrencyValues,
    pub market_cap: CurrencyValues,
}

impl Tick {
    /// Per-currency values for `metric`.
    pub fn values(&self, metric: Metric) -> &CurrencyValues {
        match metric {
            Metric::Price => &self.price,
            Metric::Volume24h => &self.volume_24h,
            Metric::MarketCap => &self.market_cap,
        }
    }

    pub(crate) fn values_mut(&mut self, metric: Metric) -> &mut CurrencyValues {
        match metric {
            Metric::Price => &mut self.price,
            Metric::Volume24h => &mut self.volume_24h,
            Metric::MarketCap => &mut self.market_cap,
        }
    }

    /// Record a metric value, typically while decoding.
    pub fn set_value(&mut self, metric: Metric, currency: Currency, value: f64) {
        self.values_mut(metric).set(currency, value);
    }
}
