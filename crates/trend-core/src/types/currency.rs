//! Currency codes and per-currency metric values.
//!
//! The quote API reports every metric once per currency under keys such as
//! `price_usd` or `24h_volume_aud`. Instead of one struct per metric with one
//! field per currency, a single [`CurrencyValues`] container is keyed by the
//! closed [`Currency`] enumeration and labelled by a [`Metric`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TrendError};

// ---------------------------------------------------------------------------
// Currency
// ---------------------------------------------------------------------------

/// Currencies the quote API can convert to, plus BTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Currency {
    Aud,
    Brl,
    Btc,
    Cad,
    Chf,
    Clp,
    Cny,
    Czk,
    Dkk,
    Eur,
    Gbp,
    Hkd,
    Huf,
    Idr,
    Ils,
    Inr,
    Jpy,
    Krw,
    Mxn,
    Myr,
    Nok,
    Nzd,
    Php,
    Pkr,
    Pln,
    Rub,
    Sek,
    Sgd,
    Thb,
    Try,
    Twd,
    Usd,
    Zar,
}

impl Currency {
    /// Every supported currency, in wire-code order.
    pub const ALL: [Currency; 33] = [
        Self::Aud,
        Self::Brl,
        Self::Btc,
        Self::Cad,
        Self::Chf,
        Self::Clp,
        Self::Cny,
        Self::Czk,
        Self::Dkk,
        Self::Eur,
        Self::Gbp,
        Self::Hkd,
        Self::Huf,
        Self::Idr,
        Self::Ils,
        Self::Inr,
        Self::Jpy,
        Self::Krw,
        Self::Mxn,
        Self::Myr,
        Self::Nok,
        Self::Nzd,
        Self::Php,
        Self::Pkr,
        Self::Pln,
        Self::Rub,
        Self::Sek,
        Self::Sgd,
        Self::Thb,
        Self::Try,
        Self::Twd,
        Self::Usd,
        Self::Zar,
    ];

    /// Lowercase code used as the field-name suffix (e.g. `"aud"`).
    pub const fn code(self) -> &'static str {
        match self {
            Self::Aud => "aud",
            Self::Brl => "brl",
            Self::Btc => "btc",
            Self::Cad => "cad",
            Self::Chf => "chf",
            Self::Clp => "clp",
            Self::Cny => "cny",
            Self::Czk => "czk",
            Self::Dkk => "dkk",
            Self::Eur => "eur",
            Self::Gbp => "gbp",
            Self::Hkd => "hkd",
            Self::Huf => "huf",
            Self::Idr => "idr",
            Self::Ils => "ils",
            Self::Inr => "inr",
            Self::Jpy => "jpy",
            Self::Krw => "krw",
            Self::Mxn => "mxn",
            Self::Myr => "myr",
            Self::Nok => "nok",
            Self::Nzd => "nzd",
            Self::Php => "php",
            Self::Pkr => "pkr",
            Self::Pln => "pln",
            Self::Rub => "rub",
            Self::Sek => "sek",
            Self::Sgd => "sgd",
            Self::Thb => "thb",
            Self::Try => "try",
            Self::Twd => "twd",
            Self::Usd => "usd",
            Self::Zar => "zar",
        }
    }

    /// Case-insensitive lookup by code.
    pub fn from_code(code: &str) -> Result<Self> {
        let lower = code.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.code() == lower)
            .ok_or_else(|| TrendError::UnsupportedCurrency(code.to_string()))
    }

    /// USD and BTC are always present in a tick and always encoded.
    pub const fn is_base(self) -> bool {
        matches!(self, Self::Usd | Self::Btc)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = TrendError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_code(s)
    }
}

// ---------------------------------------------------------------------------
// Metric
// ---------------------------------------------------------------------------

/// The three per-currency metrics carried by a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Price,
    Volume24h,
    MarketCap,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Self::Price, Self::Volume24h, Self::MarketCap];

    /// Wire prefix shared by the JSON keys and the point field names.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Volume24h => "24h_volume",
            Self::MarketCap => "market_cap",
        }
    }

    /// Field name for this metric in `currency`, e.g. `price_aud`.
    pub fn field_name(self, currency: Currency) -> String {
        format!("{}_{}", self.prefix(), currency.code())
    }

    /// Base currencies always encoded for this metric.
    ///
    /// Only price is quoted in BTC.
    pub const fn base_currencies(self) -> &'static [Currency] {
        match self {
            Self::Price => &[Currency::Usd, Currency::Btc],
            Self::Volume24h | Self::MarketCap => &[Currency::Usd],
        }
    }

    /// Split a wire key such as `market_cap_eur` into metric and currency.
    ///
    /// Returns `None` for keys that are not per-currency metrics or whose
    /// suffix is not a supported currency.
    pub fn parse_field(key: &str) -> Option<(Metric, Currency)> {
        Self::ALL.iter().find_map(|m| {
            let suffix = key.strip_prefix(m.prefix())?.strip_prefix('_')?;
            Currency::from_code(suffix).ok().map(|c| (*m, c))
        })
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

// ---------------------------------------------------------------------------
// CurrencyValues
// ---------------------------------------------------------------------------

/// Values of one metric keyed by currency.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrencyValues {
    values: BTreeMap<Currency, f64>,
}

impl CurrencyValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, currency: Currency) -> Option<f64> {
        self.values.get(&currency).copied()
    }

    pub fn set(&mut self, currency: Currency, value: f64) {
        self.values.insert(currency, value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
