//! Typed error definitions for the trend collector.
//!
//! [`TrendError`] is returned by every library crate in the workspace. The
//! runner binary folds it into `anyhow::Error` at the top level.

use thiserror::Error;

/// Convenience alias used across the workspace.
pub type Result<T> = std::result::Result<T, TrendError>;

/// Domain-specific errors for the trend collector.
#[derive(Debug, Error)]
pub enum TrendError {
    /// Configuration parsing or validation error.
    #[error("config error: {0}")]
    Config(String),

    /// A currency code outside the supported set.
    #[error("unsupported currency: {0}")]
    UnsupportedCurrency(String),

    /// Transport failure from the HTTP client, surfaced verbatim.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Quote response could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// The quote endpoint answered with an empty array.
    #[error("empty response from {0}")]
    EmptyResponse(String),

    /// A point could not be serialized to line protocol.
    #[error("encode error: {0}")]
    Encode(String),

    /// The time-series database rejected a write.
    #[error("sink error: status {status}: {message}")]
    Sink { status: u16, message: String },
}

impl From<serde_json::Error> for TrendError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}
