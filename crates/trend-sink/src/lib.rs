//! # trend-sink
//!
//! Encoding ticks as time-series points and writing them to InfluxDB.
//!
//! - [`encoder`]: `Tick` to `Point` conversion
//! - [`line_protocol`]: InfluxDB line-protocol serialization
//! - [`influx`]: HTTP write client implementing [`PointSink`]
//! - [`persister`]: single-consumer write loop
//! - [`event`]: write outcomes reported to the supervisor

pub mod encoder;
pub mod event;
pub mod influx;
pub mod line_protocol;
pub mod persister;

use async_trait::async_trait;
use trend_core::{Batch, Result};

/// A destination for point batches.
///
/// The destination (address, credentials) is fixed when the sink is built;
/// each call writes one batch and is not retried.
#[async_trait]
pub trait PointSink: Send + Sync {
    async fn write(&self, batch: &Batch) -> Result<()>;
}
