//! Driver API gateway library.
//!
//! Per-client rate limiting in front of a transparent reverse proxy to the
//! driver-service backend.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
