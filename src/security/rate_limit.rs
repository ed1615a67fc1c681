//! Per-client admission control (sliding window log).

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::broadcast;

use crate::config::RateLimitConfig;
use crate::error::GatewayError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::window_store::ClientWindowStore;

/// Admits at most `limit` requests per client in any trailing `window`.
#[derive(Debug)]
pub struct RateLimiter {
    store: ClientWindowStore,
    limit: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            store: ClientWindowStore::new(),
            limit: limit as usize,
            window,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.limit, Duration::from_millis(config.window_ms))
    }

    /// Decide whether `client_id` may send a request at `now`.
    ///
    /// Timestamps at least `window` old no longer count. A client already
    /// holding `limit` timestamps is rejected and its window is left as is.
    pub fn admit(&self, client_id: &str, now: Instant) -> bool {
        self.store.try_record(client_id, now, self.limit, self.window)
    }

    /// Remove clients whose window has emptied as of `now`.
    pub fn sweep(&self, now: Instant) -> usize {
        self.store.sweep(now, self.window)
    }

    pub fn tracked_clients(&self) -> usize {
        self.store.len()
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

/// Periodically reap idle clients until shutdown is signalled.
pub async fn run_sweeper(
    limiter: Arc<RateLimiter>,
    every: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let removed = limiter.sweep(Instant::now());
                let tracked = limiter.tracked_clients();
                metrics::record_tracked_clients(tracked);
                if removed > 0 {
                    tracing::debug!(removed, tracked, "Reaped idle rate-limit windows");
                }
            }
            _ = shutdown.recv() => {
                tracing::debug!("Rate-limit sweeper stopping");
                break;
            }
        }
    }
}

/// Middleware applied to forward routes only.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let client = state.identity.resolve(&request);

    if state.limiter.admit(&client, Instant::now()) {
        next.run(request).await
    } else {
        tracing::warn!(client = %client, path = %request.uri().path(), "Rate limit exceeded");
        metrics::record_rate_limited();
        GatewayError::AdmissionRejected.into_response()
    }
}
