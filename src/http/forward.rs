//! Request forwarding to the driver-service backend.
//!
//! # Responsibilities
//! - Build the outbound request: same method, base URL + raw path + raw query
//! - Copy headers through the [`HeaderPolicy`]
//! - Stream the inbound body upstream without buffering
//! - Relay status, `Content-Type` and the fully read body back
//!
//! # Design Decisions
//! - No retries, no gateway-imposed request timeout
//! - Path and query are concatenated as received, never re-encoded
//! - All other upstream response headers are dropped

use std::time::Duration;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderValue, Request, Response, Uri},
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::UpstreamConfig;
use crate::error::GatewayError;
use crate::observability::metrics;
use crate::security::HeaderPolicy;

/// Forwards admitted requests to a single backend.
#[derive(Clone)]
pub struct Forwarder {
    base_url: String,
    client: Client<HttpConnector, Body>,
    headers: HeaderPolicy,
}

impl Forwarder {
    pub fn new(config: &UpstreamConfig, headers: HeaderPolicy) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(config.connect_timeout_ms.map(Duration::from_millis));

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            headers,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Backend URL for an inbound request target.
    pub fn target_url(&self, inbound: &Uri) -> String {
        let mut target = format!("{}{}", self.base_url, inbound.path());
        if let Some(query) = inbound.query().filter(|q| !q.is_empty()) {
            target.push('?');
            target.push_str(query);
        }
        target
    }

    /// Send `inbound` to the backend and relay its answer.
    pub async fn forward(&self, inbound: Request<Body>) -> Result<Response<Body>, GatewayError> {
        let (parts, body) = inbound.into_parts();
        let method = parts.method.clone();
        let target = self.target_url(&parts.uri);

        let mut builder = Request::builder().method(parts.method).uri(target.as_str());
        if let Some(headers) = builder.headers_mut() {
            self.headers.copy(&parts.headers, headers);
        }

        let outbound = builder.body(body).map_err(|e| {
            tracing::error!(target_url = %target, error = %e, "Failed to build upstream request");
            self.fail(GatewayError::RequestConstruction(e))
        })?;

        tracing::debug!(method = %method, target_url = %target, "Forwarding request");

        let upstream: Response<hyper::body::Incoming> =
            self.client.request(outbound).await.map_err(|e| {
                tracing::error!(target_url = %target, error = %e, "Upstream error");
                self.fail(GatewayError::UpstreamUnavailable(e))
            })?;

        let status = upstream.status();
        let content_type = upstream.headers().get(CONTENT_TYPE).cloned();

        let bytes = axum::body::to_bytes(Body::new(upstream.into_body()), usize::MAX)
            .await
            .map_err(|e| {
                tracing::error!(target_url = %target, status = %status, error = %e, "Failed to read upstream response");
                self.fail(GatewayError::ResponseRead(e))
            })?;

        tracing::debug!(
            method = %method,
            target_url = %target,
            status = %status,
            bytes = bytes.len(),
            "Upstream responded"
        );

        Ok(relay(status, content_type, bytes))
    }

    fn fail(&self, err: GatewayError) -> GatewayError {
        metrics::record_upstream_error(err.kind());
        err
    }
}

fn relay(
    status: axum::http::StatusCode,
    content_type: Option<HeaderValue>,
    body: axum::body::Bytes,
) -> Response<Body> {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    if let Some(content_type) = content_type {
        response.headers_mut().insert(CONTENT_TYPE, content_type);
    }
    response
}
