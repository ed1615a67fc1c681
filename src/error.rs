//! Request-path errors and their client-facing rendering.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Everything that can end a request before a backend response is relayed.
///
/// Each variant renders as `{"error": <message>}` with a fixed message; the
/// underlying cause is logged, never sent to the client.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("client exceeded its request rate")]
    AdmissionRejected,

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(#[source] hyper_util::client::legacy::Error),

    #[error("failed to build upstream request: {0}")]
    RequestConstruction(#[source] axum::http::Error),

    #[error("failed to read upstream response: {0}")]
    ResponseRead(#[source] axum::Error),

    #[error("no route for request")]
    NotFound,

    #[error("method not registered for path")]
    MethodNotAllowed,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::AdmissionRejected => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            GatewayError::RequestConstruction(_) | GatewayError::ResponseRead(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// The stable message placed in the JSON body.
    pub fn client_message(&self) -> &'static str {
        match self {
            GatewayError::AdmissionRejected => "rate limit exceeded",
            GatewayError::UpstreamUnavailable(_) => "driver-service unavailable",
            GatewayError::RequestConstruction(_) => "failed to create request",
            GatewayError::ResponseRead(_) => "failed to read response",
            GatewayError::NotFound => "not found",
            GatewayError::MethodNotAllowed => "method not allowed",
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::AdmissionRejected => "admission_rejected",
            GatewayError::UpstreamUnavailable(_) => "upstream_unavailable",
            GatewayError::RequestConstruction(_) => "request_construction",
            GatewayError::ResponseRead(_) => "response_read",
            GatewayError::NotFound => "not_found",
            GatewayError::MethodNotAllowed => "method_not_allowed",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({ "error": self.client_message() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn render(err: GatewayError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_rate_limit_body() {
        let (status, body) = render(GatewayError::AdmissionRejected).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body, serde_json::json!({ "error": "rate limit exceeded" }));
    }

    #[tokio::test]
    async fn test_construction_error_body() {
        let err = axum::http::Request::builder()
            .uri("http://[bad")
            .body(())
            .unwrap_err();
        let (status, body) = render(GatewayError::RequestConstruction(err)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "error": "failed to create request" }));
    }

    #[tokio::test]
    async fn test_response_read_body() {
        let err = axum::Error::new(std::io::Error::other("reset"));
        let (status, body) = render(GatewayError::ResponseRead(err)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "error": "failed to read response" }));
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let (status, body) = render(GatewayError::NotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({ "error": "not found" }));
    }

    #[tokio::test]
    async fn test_method_not_allowed_body() {
        let (status, body) = render(GatewayError::MethodNotAllowed).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, serde_json::json!({ "error": "method not allowed" }));
    }
}
