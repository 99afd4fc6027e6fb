//! Single-consumer write loop.
//!
//! The [`Persister`] takes ticks one at a time, encodes each into a point,
//! writes it as a one-point batch and reports the outcome as a
//! [`PersistEvent`]. Encode and write failures are reported and skipped.
//! Failing to allocate a batch ends the task with an error.
//!
//! Points are written strictly in arrival order. Once quit is observed no new
//! write is started; a write already in progress runs to completion.

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};
use trend_core::shutdown::QuitListener;
use trend_core::{Batch, BatchConfig, Result, Tick};

use crate::PointSink;
use crate::encoder::encode_tick;
use crate::event::{PersistEvent, PersistEventSender};

/// Owns the sink for the lifetime of the process.
pub struct Persister<K> {
    sink: K,
    batch_config: BatchConfig,
    convert: String,
    events: PersistEventSender,
}

impl<K: PointSink> Persister<K> {
    pub fn new(sink: K, batch_config: BatchConfig, convert: impl Into<String>, events: PersistEventSender) -> Self {
        Self { sink, batch_config, convert: convert.into(), events }
    }

    /// Consume ticks until quit is observed or the tick channel closes.
    ///
    /// Returning `Ok` is the done notification for the supervisor.
    pub async fn run(self, mut ticks: UnboundedReceiver<Tick>, mut quit: QuitListener) -> Result<()> {
        info!("persister started, database='{}', convert='{}'", self.batch_config.database, self.convert);
        loop {
            tokio::select! {
                biased;

                _ = quit.triggered() => {
                    info!("persister stopped");
                    return Ok(());
                }
                tick = ticks.recv() => match tick {
                    Some(tick) => self.persist(tick).await?,
                    None => {
                        info!("tick channel closed, persister exiting");
                        return Ok(());
                    }
                },
            }
        }
    }

    async fn persist(&self, tick: Tick) -> Result<()> {
        let mut batch = Batch::new(&self.batch_config)?;
        let measurement = tick.id.clone();

        let outcome = match encode_tick(&tick, &self.convert) {
            Ok(point) => {
                batch.add_point(point);
                self.sink.write(&batch).await
            }
            Err(e) => Err(e),
        };

        let event = match outcome {
            Ok(()) => PersistEvent::Written { measurement, points: batch.len() },
            Err(e) => PersistEvent::WriteFailed { measurement, error: e.to_string() },
        };
        if self.events.send(event).is_err() {
            debug!("event receiver closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use tokio::sync::mpsc;
    use trend_core::shutdown::QuitSignal;
    use trend_core::{Currency, CurrencyValues, Metric, Precision, TrendError};

    use super::*;

    fn tick(id: &str) -> Tick {
        let mut t = Tick {
            id: id.into(),
            name: id.into(),
            symbol: id.to_uppercase(),
            rank: 1,
            available_supply: None,
            total_supply: None,
            max_supply: None,
            last_updated: Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap(),
            price: CurrencyValues::new(),
            volume_24h: CurrencyValues::new(),
            market_cap: CurrencyValues::new(),
        };
        for metric in Metric::ALL {
            for currency in [Currency::Usd, Currency::Btc, Currency::Aud] {
                t.set_value(metric, currency, 1.0);
            }
        }
        t
    }

    /// Records every batch it is asked to write.
    #[derive(Clone, Default)]
    struct RecordingSink {
        written: Arc<Mutex<Vec<Vec<String>>>>,
        failing: Arc<HashSet<String>>,
        delay: Duration,
    }

    impl RecordingSink {
        fn written(&self) -> Vec<String> {
            self.written.lock().unwrap().iter().flatten().cloned().collect()
        }
    }

    #[async_trait]
    impl PointSink for RecordingSink {
        async fn write(&self, batch: &Batch) -> Result<()> {
            let names: Vec<String> = batch.points().iter().map(|p| p.measurement.clone()).collect();
            self.written.lock().unwrap().push(names.clone());
            tokio::time::sleep(self.delay).await;
            if names.iter().any(|n| self.failing.contains(n)) {
                return Err(TrendError::Sink { status: 500, message: "timeout".into() });
            }
            Ok(())
        }
    }

    fn crypto() -> BatchConfig {
        BatchConfig { database: "crypto".into(), precision: Precision::Seconds }
    }

    const WAIT: Duration = Duration::from_secs(2);

    #[tokio::test]
    async fn writes_in_arrival_order_with_slow_sink() {
        let sink = RecordingSink { delay: Duration::from_millis(20), ..Default::default() };
        let quit = QuitSignal::new();
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(Persister::new(sink.clone(), crypto(), "aud", event_tx).run(tick_rx, quit.subscribe()));

        for id in ["t1", "t2", "t3"] {
            tick_tx.send(tick(id)).unwrap();
        }
        for id in ["t1", "t2", "t3"] {
            let ev = tokio::time::timeout(WAIT, event_rx.recv()).await.unwrap().unwrap();
            assert_eq!(ev, PersistEvent::Written { measurement: id.into(), points: 1 });
        }
        assert_eq!(sink.written(), ["t1", "t2", "t3"]);
        assert!(sink.written.lock().unwrap().iter().all(|b| b.len() == 1));

        quit.trigger();
        tokio::time::timeout(WAIT, task).await.unwrap().unwrap().unwrap();
    }

    #[tokio::test]
    async fn write_failure_is_reported_and_processing_continues() {
        let sink = RecordingSink { failing: Arc::new(HashSet::from(["bad".to_string()])), ..Default::default() };
        let quit = QuitSignal::new();
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(Persister::new(sink.clone(), crypto(), "aud", event_tx).run(tick_rx, quit.subscribe()));

        tick_tx.send(tick("bad")).unwrap();
        tick_tx.send(tick("good")).unwrap();

        let first = tokio::time::timeout(WAIT, event_rx.recv()).await.unwrap().unwrap();
        assert_eq!(
            first,
            PersistEvent::WriteFailed { measurement: "bad".into(), error: "sink error: status 500: timeout".into() }
        );
        let second = tokio::time::timeout(WAIT, event_rx.recv()).await.unwrap().unwrap();
        assert_eq!(second, PersistEvent::Written { measurement: "good".into(), points: 1 });

        drop(tick_tx);
        tokio::time::timeout(WAIT, task).await.unwrap().unwrap().unwrap();
        assert_eq!(sink.written(), ["bad", "good"]);
    }

    #[tokio::test]
    async fn encode_failure_skips_write() {
        let sink = RecordingSink::default();
        let quit = QuitSignal::new();
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let persister = Persister::new(sink.clone(), crypto(), "doge", event_tx);
        let task = tokio::spawn(persister.run(tick_rx, quit.subscribe()));

        tick_tx.send(tick("bitcoin")).unwrap();
        let ev = tokio::time::timeout(WAIT, event_rx.recv()).await.unwrap().unwrap();
        assert!(matches!(ev, PersistEvent::WriteFailed { ref error, .. } if error.contains("doge")));
        assert!(sink.written().is_empty());

        quit.trigger();
        tokio::time::timeout(WAIT, task).await.unwrap().unwrap().unwrap();
    }

    #[tokio::test]
    async fn no_write_starts_after_quit() {
        let sink = RecordingSink::default();
        let quit = QuitSignal::new();
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let (event_tx, _event_rx) = mpsc::unbounded_channel();

        tick_tx.send(tick("queued")).unwrap();
        quit.trigger();
        let persister = Persister::new(sink.clone(), crypto(), "aud", event_tx);
        let res = tokio::time::timeout(WAIT, persister.run(tick_rx, quit.subscribe())).await.unwrap();
        assert!(res.is_ok());
        assert!(sink.written().is_empty());
    }

    #[tokio::test]
    async fn in_flight_write_finishes_then_stops() {
        let sink = RecordingSink { delay: Duration::from_millis(150), ..Default::default() };
        let quit = QuitSignal::new();
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(Persister::new(sink.clone(), crypto(), "aud", event_tx).run(tick_rx, quit.subscribe()));

        tick_tx.send(tick("first")).unwrap();
        tick_tx.send(tick("second")).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        quit.trigger();

        tokio::time::timeout(WAIT, task).await.unwrap().unwrap().unwrap();
        assert_eq!(sink.written(), ["first"]);
        assert_eq!(event_rx.recv().await.unwrap(), PersistEvent::Written { measurement: "first".into(), points: 1 });
    }

    #[tokio::test]
    async fn batch_allocation_failure_is_fatal() {
        let sink = RecordingSink::default();
        let quit = QuitSignal::new();
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let (event_tx, _event_rx) = mpsc::unbounded_channel();
        let no_db = BatchConfig { database: String::new(), precision: Precision::Seconds };

        tick_tx.send(tick("bitcoin")).unwrap();
        let persister = Persister::new(sink.clone(), no_db, "aud", event_tx);
        let res = tokio::time::timeout(WAIT, persister.run(tick_rx, quit.subscribe())).await.unwrap();
        assert!(matches!(res, Err(TrendError::Config(_))));
        assert!(sink.written().is_empty());
    }
}
