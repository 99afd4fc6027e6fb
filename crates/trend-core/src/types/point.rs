//! Time-series points and write batches.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{Result, TrendError};

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// One time-series record.
///
/// Tags and fields live in sorted maps so a point always serializes the same
/// way regardless of insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub measurement: String,
    pub tags: BTreeMap<String, String>,
    pub fields: BTreeMap<String, f64>,
    pub timestamp: DateTime<Utc>,
}

impl Point {
    pub fn new(measurement: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self { measurement: measurement.into(), tags: BTreeMap::new(), fields: BTreeMap::new(), timestamp }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn add_field(&mut self, key: impl Into<String>, value: f64) {
        self.fields.insert(key.into(), value);
    }
}

// ---------------------------------------------------------------------------
// Precision
// ---------------------------------------------------------------------------

/// Timestamp precision of a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Precision {
    #[default]
    #[serde(rename = "s")]
    Seconds,
    #[serde(rename = "ms")]
    Milliseconds,
    #[serde(rename = "u", alias = "us")]
    Microseconds,
    #[serde(rename = "ns", alias = "n")]
    Nanoseconds,
}

impl Precision {
    /// Query-string value understood by the database.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Seconds => "s",
            Self::Milliseconds => "ms",
            Self::Microseconds => "u",
            Self::Nanoseconds => "ns",
        }
    }

    /// Integer timestamp of `ts` at this precision.
    ///
    /// Nanoseconds overflow `i64` after the year 2262.
    pub fn timestamp(self, ts: &DateTime<Utc>) -> Result<i64> {
        match self {
            Self::Seconds => Ok(ts.timestamp()),
            Self::Milliseconds => Ok(ts.timestamp_millis()),
            Self::Microseconds => Ok(ts.timestamp_micros()),
            Self::Nanoseconds => ts
                .timestamp_nanos_opt()
                .ok_or_else(|| TrendError::Encode(format!("timestamp {ts} out of nanosecond range"))),
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Precision {
    type Err = TrendError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "s" => Ok(Self::Seconds),
            "ms" => Ok(Self::Milliseconds),
            "u" | "us" => Ok(Self::Microseconds),
            "ns" | "n" => Ok(Self::Nanoseconds),
            other => Err(TrendError::Config(format!("unknown precision '{other}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

/// Destination database and precision shared by every batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    pub database: String,
    pub precision: Precision,
}

/// An ordered group of points written in one call.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    database: String,
    precision: Precision,
    points: Vec<Point>,
}

impl Batch {
    /// Allocate an empty batch. Fails when no database is named.
    pub fn new(config: &BatchConfig) -> Result<Self> {
        if config.database.trim().is_empty() {
            return Err(TrendError::Config("batch requires a database name".into()));
        }
        Ok(Self { database: config.database.clone(), precision: config.precision, points: Vec::new() })
    }

    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
