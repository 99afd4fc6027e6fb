//! Ticker JSON decoding.
//!
//! The endpoint answers with an array of flat objects:
//!
//! ```json
//! [{
//!   "id": "bitcoin", "name": "Bitcoin", "symbol": "BTC", "rank": "1",
//!   "price_usd": "50000.0", "price_btc": "1.0", "24h_volume_usd": "3.1e10",
//!   "market_cap_usd": "9.3e11", "available_supply": "18500000.0",
//!   "total_supply": "18500000.0", "max_supply": "21000000.0",
//!   "percent_change_1h": "0.3", "last_updated": "1609459200",
//!   "price_aud": "70000.0", "24h_volume_aud": "4.3e10", "market_cap_aud": "1.3e12"
//! }]
//! ```
//!
//! Every `<metric>_<currency>` key is collected; other keys are ignored.

use trend_core::{CurrencyValues, Metric, Result, Tick, TrendError};

use crate::json_util::{parse_epoch_secs, parse_f64_field, parse_str_i64, required_str};

/// Decode a full ticker array response.
pub fn parse_ticker_array(body: &str) -> Result<Vec<Tick>> {
    let v: serde_json::Value = serde_json::from_str(body)?;
    let items = v.as_array().ok_or_else(|| TrendError::Parse("expected a JSON array of tickers".into()))?;
    items.iter().map(parse_ticker).collect()
}

/// Decode one ticker object.
pub fn parse_ticker(v: &serde_json::Value) -> Result<Tick> {
    let obj = v.as_object().ok_or_else(|| TrendError::Parse("ticker is not an object".into()))?;

    let id = required_str(v, "id")?.to_string();
    let last_updated = parse_epoch_secs(obj.get("last_updated"))?
        .ok_or_else(|| TrendError::Parse(format!("ticker {id} has no last_updated")))?;
    let rank = match parse_str_i64(obj.get("rank"))? {
        Some(r) => u32::try_from(r).map_err(|_| TrendError::Parse(format!("ticker {id} has invalid rank {r}")))?,
        None => 0,
    };

    let mut tick = Tick {
        symbol: required_str(v, "symbol")?.to_string(),
        name: obj.get("name").and_then(|n| n.as_str()).unwrap_or_default().to_string(),
        rank,
        available_supply: parse_f64_field(obj, "available_supply")?,
        total_supply: parse_f64_field(obj, "total_supply")?,
        max_supply: parse_f64_field(obj, "max_supply")?,
        last_updated,
        price: CurrencyValues::new(),
        volume_24h: CurrencyValues::new(),
        market_cap: CurrencyValues::new(),
        id,
    };

    for key in obj.keys() {
        let Some((metric, currency)) = Metric::parse_field(key) else {
            continue;
        };
        if let Some(x) = parse_f64_field(obj, key)? {
            tick.set_value(metric, currency, x);
        }
    }

    Ok(tick)
}
