//! Shutdown coordination for the gateway.
//!
//! One [`Shutdown`] is created at startup. The HTTP server and the
//! rate-limit sweeper each subscribe before they start; a single trigger,
//! from an OS signal or from a test, stops both.

use tokio::sync::broadcast;

use crate::lifecycle::signals;

/// Coordinator for graceful shutdown.
///
/// Cloning shares the same channel, so any clone can trigger or subscribe.
#[derive(Debug, Clone)]
pub struct Shutdown {
    /// Broadcast sender; capacity 1 since the only message is "stop".
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a coordinator with no subscribers yet.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    ///
    /// Subscribe before the task starts: a receiver created after
    /// [`trigger`](Self::trigger) never sees the message.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Notify every subscriber. Returns how many were reached.
    pub fn trigger(&self) -> usize {
        let reached = self.tx.send(()).unwrap_or(0);
        tracing::debug!(subscribers = reached, "Shutdown triggered");
        reached
    }

    /// Wait for SIGINT or SIGTERM, then trigger.
    pub async fn trigger_on_signal(self) {
        signals::wait_for_signal().await;
        self.trigger();
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
