//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): responses by method and status
//! - `gateway_request_duration_seconds` (histogram): end-to-end latency
//! - `gateway_rate_limited_total` (counter): admission rejections
//! - `gateway_upstream_errors_total` (counter): forwarding failures by kind
//! - `gateway_tracked_clients` (gauge): clients holding a rate-limit window
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record method, status and latency of every response.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    ::metrics::counter!("gateway_requests_total", "method" => method, "status" => status)
        .increment(1);
    ::metrics::histogram!("gateway_request_duration_seconds")
        .record(start.elapsed().as_secs_f64());

    response
}

pub fn record_rate_limited() {
    ::metrics::counter!("gateway_rate_limited_total").increment(1);
}

pub fn record_upstream_error(kind: &'static str) {
    ::metrics::counter!("gateway_upstream_errors_total", "kind" => kind).increment(1);
}

pub fn record_tracked_clients(count: usize) {
    ::metrics::gauge!("gateway_tracked_clients").set(count as f64);
}
