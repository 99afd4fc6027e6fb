//! # trend-core
//!
//! Core crate for the trend price collector, providing:
//!
//! - **Types** (`types`): currency codes, per-currency metric values, ticks, points and batches
//! - **Configuration** (`config`): JSON config deserialization and validation
//! - **Error types** (`error`): domain-specific `TrendError` via thiserror
//! - **Shutdown** (`shutdown`): broadcast quit signal for cooperative cancellation
//! - **Logging** (`logging`): tracing-based structured logging

pub mod config;
pub mod error;
pub mod logging;
pub mod shutdown;
pub mod types;

pub use error::{Result, TrendError};
// Re-export types at crate root for convenience.
pub use types::*;
