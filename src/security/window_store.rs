//! Per-client sliding window log.
//!
//! Each client keeps the instants of its admitted requests that are still
//! inside the trailing window. Windows live in a sharded map, so checks for
//! different clients only contend when they hash to the same shard.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Admitted-request timestamps for one client, oldest first.
#[derive(Debug, Default)]
pub struct ClientWindow {
    timestamps: VecDeque<Instant>,
}

impl ClientWindow {
    /// Drop every timestamp at least `window` old relative to `now`.
    pub fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(oldest) = self.timestamps.front() {
            if now.saturating_duration_since(*oldest) >= window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    fn record(&mut self, now: Instant) {
        self.timestamps.push_back(now);
    }
}

/// Concurrent map of client identity to [`ClientWindow`].
#[derive(Debug, Default)]
pub struct ClientWindowStore {
    windows: DashMap<String, ClientWindow>,
}

impl ClientWindowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prune the client's window, then record `now` if fewer than `limit`
    /// timestamps remain. Returns whether `now` was recorded.
    ///
    /// The whole sequence runs under the shard lock for `client_id`.
    pub fn try_record(&self, client_id: &str, now: Instant, limit: usize, window: Duration) -> bool {
        // known clients skip the key allocation
        if let Some(mut client) = self.windows.get_mut(client_id) {
            return Self::admit(client.value_mut(), now, limit, window);
        }

        let mut entry = self.windows.entry(client_id.to_string()).or_default();
        Self::admit(entry.value_mut(), now, limit, window)
    }

    fn admit(client: &mut ClientWindow, now: Instant, limit: usize, window: Duration) -> bool {
        client.prune(now, window);
        if client.len() >= limit {
            return false;
        }

        client.record(now);
        true
    }

    /// Prune every window and drop clients left with no timestamps.
    /// Returns the number of clients removed.
    pub fn sweep(&self, now: Instant, window: Duration) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, client| {
            client.prune(now, window);
            !client.is_empty()
        });
        before.saturating_sub(self.windows.len())
    }

    /// Number of admitted requests currently counted for a client.
    pub fn count(&self, client_id: &str) -> usize {
        self.windows.get(client_id).map(|w| w.len()).unwrap_or(0)
    }

    /// Number of clients currently tracked.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}
