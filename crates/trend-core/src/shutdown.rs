//! Broadcast quit signal for cooperative shutdown.
//!
//! [`QuitSignal`] is owned by whoever decides the process should stop (the
//! signal listener). Any number of [`QuitListener`]s observe it at their next
//! suspension point; nothing is interrupted forcibly. Triggering is idempotent
//! and dropping the owner counts as a trigger, so listeners never hang on a
//! signal that can no longer fire.

use tokio::sync::watch;

/// Owning half of the quit signal.
#[derive(Debug)]
pub struct QuitSignal {
    tx: watch::Sender<bool>,
}

impl QuitSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Close the signal. Safe to call any number of times.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Create a new listener. Listeners created after a trigger see it at once.
    pub fn subscribe(&self) -> QuitListener {
        QuitListener { rx: self.tx.subscribe() }
    }
}

impl Default for QuitSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Observing half of the quit signal.
#[derive(Debug, Clone)]
pub struct QuitListener {
    rx: watch::Receiver<bool>,
}

impl QuitListener {
    /// Resolve once quit has been triggered or the [`QuitSignal`] is dropped.
    ///
    /// Cancel-safe: usable as a `tokio::select!` branch inside a loop.
    pub async fn triggered(&mut self) {
        let _ = self.rx.wait_for(|quit| *quit).await;
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn all_listeners_observe_trigger() {
        let quit = QuitSignal::new();
        let mut a = quit.subscribe();
        let mut b = a.clone();
        assert!(!a.is_triggered());

        quit.trigger();
        quit.trigger();

        tokio::time::timeout(Duration::from_secs(1), a.triggered()).await.unwrap();
        tokio::time::timeout(Duration::from_secs(1), b.triggered()).await.unwrap();
        assert!(quit.is_triggered());
    }

    #[tokio::test]
    async fn late_subscriber_sees_trigger() {
        let quit = QuitSignal::new();
        quit.trigger();
        let mut late = quit.subscribe();
        assert!(late.is_triggered());
        tokio::time::timeout(Duration::from_secs(1), late.triggered()).await.unwrap();
    }

    #[tokio::test]
    async fn dropping_signal_releases_listeners() {
        let quit = QuitSignal::new();
        let mut listener = quit.subscribe();
        drop(quit);
        assert!(listener.is_triggered());
        tokio::time::timeout(Duration::from_secs(1), listener.triggered()).await.unwrap();
    }

    #[tokio::test]
    async fn untriggered_listener_stays_pending() {
        let quit = QuitSignal::new();
        let mut listener = quit.subscribe();
        let res = tokio::time::timeout(Duration::from_millis(50), listener.triggered()).await;
        assert!(res.is_err());
    }
}
