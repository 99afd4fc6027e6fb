//! InfluxDB line-protocol serialization.
//!
//! ```text
//! <measurement>[,<tag_key>=<tag_value>...] <field_key>=<field_value>[,...] <timestamp>
//! ```
//!
//! Measurements escape commas and spaces; tag keys, tag values and field keys
//! additionally escape `=` and backslashes. Field values are floats; the timestamp is an
//! integer at the batch precision.

use std::fmt::Write;

use trend_core::{Batch, Point, Precision, Result, TrendError};

fn escape(out: &mut String, s: &str, specials: &[char]) {
    for ch in s.chars() {
        if specials.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
}

fn escape_measurement(out: &mut String, s: &str) {
    escape(out, s, &[',', ' ']);
}

fn escape_key(out: &mut String, s: &str) {
    escape(out, s, &[',', '=', ' ', '\\']);
}

fn check_name(kind: &str, s: &str) -> Result<()> {
    if s.is_empty() {
        return Err(TrendError::Encode(format!("empty {kind}")));
    }
    if s.contains('\n') {
        return Err(TrendError::Encode(format!("{kind} '{}' contains a newline", s.escape_debug())));
    }
    Ok(())
}

/// Serialize one point as a single line (no trailing newline).
pub fn encode_point(point: &Point, precision: Precision) -> Result<String> {
    check_name("measurement", &point.measurement)?;
    if point.fields.is_empty() {
        return Err(TrendError::Encode(format!("point {} has no fields", point.measurement)));
    }

    let mut line = String::with_capacity(64 + 32 * point.fields.len());
    escape_measurement(&mut line, &point.measurement);

    for (key, value) in &point.tags {
        // Empty tag values are not representable; the tag is dropped.
        if value.is_empty() {
            continue;
        }
        check_name("tag key", key)?;
        check_name("tag value", value)?;
        line.push(',');
        escape_key(&mut line, key);
        line.push('=');
        escape_key(&mut line, value);
    }

    let mut sep = ' ';
    for (key, value) in &point.fields {
        check_name("field key", key)?;
        if !value.is_finite() {
            return Err(TrendError::Encode(format!("field {key} of {} is not finite", point.measurement)));
        }
        line.push(sep);
        escape_key(&mut line, key);
        let _ = write!(line, "={value}");
        sep = ',';
    }

    let _ = write!(line, " {}", precision.timestamp(&point.timestamp)?);
    Ok(line)
}

/// Serialize every point of `batch`, one per line.
pub fn encode_batch(batch: &Batch) -> Result<String> {
    let lines = batch
        .points()
        .iter()
        .map(|p| encode_point(p, batch.precision()))
        .collect::<Result<Vec<_>>>()?;
    Ok(lines.join("\n"))
}
