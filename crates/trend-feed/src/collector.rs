//! Timer-driven quote collection.
//!
//! The [`Collector`] owns the interval timer. On every firing it calls its
//! [`QuoteSource`] once and hands each returned [`Tick`] downstream, in the
//! order received. A failed fetch ends the task with the error: nothing is
//! retried.
//!
//! ```text
//!            timer fired              all ticks sent
//!   Idle ─────────────────► Fetching ───────────────► Idle
//!    │
//!    └── quit ──► Stopped
//! ```
//!
//! Quit is only consulted between fetches. A fetch that is already running
//! completes and its ticks are still forwarded.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};
use trend_core::shutdown::QuitListener;
use trend_core::{Result, Tick, TrendError};

use crate::QuoteSource;

/// Which currencies to collect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A single currency by API id or symbol.
    One(String),
    /// Every listed currency.
    All,
}

impl Selection {
    /// An empty symbol selects every currency.
    pub fn from_symbol(symbol: &str) -> Self {
        if symbol.is_empty() { Self::All } else { Self::One(symbol.to_string()) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorState {
    Idle,
    Fetching,
    Stopped,
}

/// Periodic fetch loop feeding the persister.
pub struct Collector<S> {
    source: S,
    selection: Selection,
    convert: String,
    interval: Duration,
    state: CollectorState,
}

impl<S: QuoteSource> Collector<S> {
    pub fn new(source: S, selection: Selection, convert: impl Into<String>, interval: Duration) -> Self {
        Self { source, selection, convert: convert.into(), interval, state: CollectorState::Idle }
    }

    fn transition(&mut self, next: CollectorState) {
        debug!("collector {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Run until quit is observed or the downstream receiver is gone.
    ///
    /// The first fetch happens one full interval after start. An interval
    /// whose deadline cannot be represented is a config error.
    pub async fn run(mut self, tx: UnboundedSender<Tick>, mut quit: QuitListener) -> Result<()> {
        let start = Instant::now()
            .checked_add(self.interval)
            .ok_or_else(|| TrendError::Config(format!("interval {:?} is out of range", self.interval)))?;
        let mut ticker = time::interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            "collector started, selection={:?}, convert='{}', interval={:?}",
            self.selection, self.convert, self.interval
        );

        loop {
            tokio::select! {
                biased;

                _ = quit.triggered() => {
                    self.transition(CollectorState::Stopped);
                    info!("collector stopped");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    self.transition(CollectorState::Fetching);
                    let ticks = match self.fetch().await {
                        Ok(ticks) => ticks,
                        Err(e) => {
                            self.transition(CollectorState::Stopped);
                            return Err(e);
                        }
                    };
                    debug!("fetched {} tick(s)", ticks.len());
                    for tick in ticks {
                        if tx.send(tick).is_err() {
                            self.transition(CollectorState::Stopped);
                            info!("tick receiver closed, collector exiting");
                            return Ok(());
                        }
                    }
                    self.transition(CollectorState::Idle);
                }
            }
        }
    }

    async fn fetch(&self) -> Result<Vec<Tick>> {
        match &self.selection {
            Selection::One(symbol) => Ok(vec![self.source.fetch_one(symbol, &self.convert).await?]),
            Selection::All => self.source.fetch_all(&self.convert).await,
        }
    }
}
