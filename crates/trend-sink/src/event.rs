//! Write outcomes emitted by the persister.
//!
//! The supervisor drains a [`PersistEventReceiver`] and logs every event, so
//! the persister itself never decides how outcomes are reported.

/// Result of persisting one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistEvent {
    /// A batch was accepted by the sink.
    Written {
        /// Measurement (tick id) of the written point.
        measurement: String,
        /// Number of points in the batch.
        points: usize,
    },

    /// Encoding or writing failed; processing continues with the next tick.
    WriteFailed {
        measurement: String,
        /// Underlying error, verbatim.
        error: String,
    },
}

/// Sender half of the persist event channel.
pub type PersistEventSender = tokio::sync::mpsc::UnboundedSender<PersistEvent>;

/// Receiver half of the persist event channel.
pub type PersistEventReceiver = tokio::sync::mpsc::UnboundedReceiver<PersistEvent>;
