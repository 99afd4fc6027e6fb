//! JSON parsing helpers for quote payloads.
//!
//! The quote API encodes every number as a JSON string (`"50000.5"`) and uses
//! `null` for figures it does not know.

use chrono::{DateTime, Utc};
use trend_core::{Result, TrendError};

/// Parse a JSON value (string or number) as `f64`.
///
/// `null`, missing keys and empty strings yield `Ok(None)`; anything else that
/// is not a number is an error.
#[inline]
pub fn parse_str_f64(v: Option<&serde_json::Value>) -> Result<Option<f64>> {
    match v {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) if s.is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => fast_float2::parse(s)
            .map(Some)
            .map_err(|_| TrendError::Parse(format!("invalid number '{s}'"))),
        Some(other) => other
            .as_f64()
            .map(Some)
            .ok_or_else(|| TrendError::Parse(format!("expected number, got {other}"))),
    }
}

/// Parse a JSON value (string or number) as `i64`.
#[inline]
pub fn parse_str_i64(v: Option<&serde_json::Value>) -> Result<Option<i64>> {
    match v {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| TrendError::Parse(format!("invalid integer '{s}'"))),
        Some(other) => other
            .as_i64()
            .map(Some)
            .ok_or_else(|| TrendError::Parse(format!("expected integer, got {other}"))),
    }
}

/// Parse a named field on a JSON object as `f64`, naming the field in errors.
#[inline]
pub fn parse_f64_field(obj: &serde_json::Map<String, serde_json::Value>, key: &str) -> Result<Option<f64>> {
    parse_str_f64(obj.get(key)).map_err(|e| match e {
        TrendError::Parse(msg) => TrendError::Parse(format!("{key}: {msg}")),
        other => other,
    })
}

/// Read a required string field from a JSON object.
pub fn required_str<'a>(v: &'a serde_json::Value, key: &str) -> Result<&'a str> {
    v.get(key)
        .and_then(|s| s.as_str())
        .ok_or_else(|| TrendError::Parse(format!("missing string field '{key}'")))
}

/// Interpret a Unix-epoch-seconds field as a UTC timestamp.
pub fn parse_epoch_secs(v: Option<&serde_json::Value>) -> Result<Option<DateTime<Utc>>> {
    match parse_str_i64(v)? {
        Some(secs) => DateTime::from_timestamp(secs, 0)
            .map(Some)
            .ok_or_else(|| TrendError::Parse(format!("timestamp {secs} out of range"))),
        None => Ok(None),
    }
}
