//! Tick to point conversion.
//!
//! Fields are always the base-currency values (`price_usd`, `price_btc`,
//! `24h_volume_usd`, `market_cap_usd`) plus, when a conversion currency other
//! than USD or BTC is requested, that currency's price, volume and market cap.
//!
//! The field set never depends on what the quote API happened to report: a
//! figure the tick lacks (sent as `null` for thinly traded coins) is written
//! as zero.

use tracing::debug;
use trend_core::{Currency, Metric, Point, Result, Tick};

/// Tag carrying the ticker symbol.
pub const SYMBOL_TAG: &str = "symbol";

/// Resolve a conversion code. Empty means "none".
pub fn conversion_currency(convert: &str) -> Result<Option<Currency>> {
    if convert.is_empty() { Ok(None) } else { Currency::from_code(convert).map(Some) }
}

/// Encode `tick` as a point with the fields requested by `convert`.
pub fn encode_tick(tick: &Tick, convert: &str) -> Result<Point> {
    let extra = conversion_currency(convert)?.filter(|c| !c.is_base());

    let mut point = Point::new(tick.id.clone(), tick.last_updated).with_tag(SYMBOL_TAG, tick.symbol.clone());
    for metric in Metric::ALL {
        for &currency in metric.base_currencies().iter().chain(extra.as_ref()) {
            let field = metric.field_name(currency);
            let value = tick.values(metric).get(currency).unwrap_or_else(|| {
                debug!("{} has no {field}, writing 0", tick.id);
                0.0
            });
            point.add_field(field, value);
        }
    }
    Ok(point)
}
