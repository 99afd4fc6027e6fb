//! Task wiring and shutdown.
//!
//! The supervisor spawns one collector and one persister, connects them with
//! an unbounded tick channel, and then waits on three things: persist events
//! (logged as they arrive), the collector's result (an error is fatal), and
//! the persister's completion (the done notification).
//!
//! ```text
//! signal ──► QuitSignal ──┬──► Collector ──ticks──► Persister ──events──► Supervisor (log)
//!                         └──────────────────────────┘                      ▲
//!                                                      done ────────────────┘
//! ```

use std::future::Future;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use trend_core::BatchConfig;
use trend_core::config::AppConfig;
use trend_core::shutdown::{QuitListener, QuitSignal};
use trend_feed::QuoteSource;
use trend_feed::collector::{Collector, Selection};
use trend_sink::PointSink;
use trend_sink::event::PersistEvent;
use trend_sink::persister::Persister;

/// What to collect, how often, and where to write it.
#[derive(Debug, Clone)]
pub struct Settings {
    pub selection: Selection,
    pub convert: String,
    pub interval: Duration,
    pub batch: BatchConfig,
}

impl Settings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            selection: Selection::from_symbol(&config.quotes.symbol),
            convert: config.quotes.convert.to_ascii_lowercase(),
            interval: config.collect.interval(),
            batch: config.influx.batch_config(),
        }
    }
}

/// Owns the quote source and sink until the pipeline is started.
pub struct Supervisor<S, K> {
    source: S,
    sink: K,
    settings: Settings,
}

impl<S, K> Supervisor<S, K>
where
    S: QuoteSource + 'static,
    K: PointSink + 'static,
{
    pub fn new(source: S, sink: K, settings: Settings) -> Self {
        Self { source, sink, settings }
    }

    /// Run the pipeline until it shuts down.
    ///
    /// Returns `Ok` after a quit-driven shutdown and `Err` when a fetch fails,
    /// a batch cannot be allocated, or a task panics.
    pub async fn run(self, quit: QuitListener) -> Result<()> {
        let Settings { selection, convert, interval, batch } = self.settings;
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();

        let collector = Collector::new(self.source, selection, convert.clone(), interval);
        let persister = Persister::new(self.sink, batch, convert, event_tx);

        let mut collector_task = tokio::spawn(collector.run(tick_tx, quit.clone()));
        let mut persister_task = tokio::spawn(persister.run(tick_rx, quit));
        let mut collector_finished = false;

        loop {
            tokio::select! {
                biased;

                Some(event) = event_rx.recv() => log_event(&event),
                res = &mut collector_task, if !collector_finished => {
                    collector_finished = true;
                    match res {
                        Ok(Ok(())) => info!("collector finished"),
                        Ok(Err(e)) => {
                            error!("fetch: {e}");
                            persister_task.abort();
                            return Err(e.into());
                        }
                        Err(e) => {
                            persister_task.abort();
                            return Err(anyhow!("collector task failed: {e}"));
                        }
                    }
                }
                res = &mut persister_task => {
                    while let Ok(event) = event_rx.try_recv() {
                        log_event(&event);
                    }
                    if !collector_finished {
                        collector_task.abort();
                    }
                    return match res {
                        Ok(Ok(())) => {
                            info!("persister done");
                            Ok(())
                        }
                        Ok(Err(e)) => {
                            error!("persister: {e}");
                            Err(e.into())
                        }
                        Err(e) => Err(anyhow!("persister task failed: {e}")),
                    };
                }
            }
        }
    }
}

fn log_event(event: &PersistEvent) {
    match event {
        PersistEvent::Written { measurement, points } => info!("wrote {points} point(s) to influx ({measurement})"),
        PersistEvent::WriteFailed { measurement, error } => warn!("write {measurement}: {error}"),
    }
}

/// Trigger `quit` on the first interrupt or termination signal.
pub async fn listen_for_signals(quit: QuitSignal) {
    quit_on(wait_for_signal(), quit).await;
}

/// Trigger `quit` once `signal` resolves. Later signals go unobserved.
async fn quit_on(signal: impl Future<Output = ()>, quit: QuitSignal) {
    signal.await;
    info!("shutdown signal received");
    quit.trigger();
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(e) => {
            warn!("cannot listen for SIGTERM: {e}");
            return wait_for_ctrl_c().await;
        }
    };
    tokio::select! {
        _ = wait_for_ctrl_c() => {}
        _ = term.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a handler the process can only be stopped externally.
        error!("cannot listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}
