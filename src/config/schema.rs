//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The driver-service backend every forward route targets.
    pub upstream: UpstreamConfig,

    /// Per-client admission settings.
    pub rate_limit: RateLimitConfig,

    /// Which inbound headers reach the backend.
    pub headers: HeaderPolicyConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Backend service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL prepended to every forwarded path (e.g., "http://localhost:8081").
    pub base_url: String,

    /// Optional TCP connect timeout in milliseconds. Unset means transport default.
    pub connect_timeout_ms: Option<u64>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081".to_string(),
            connect_timeout_ms: None,
        }
    }
}

/// Where the rate limiter takes the client identity from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClientIdentitySource {
    /// IP of the TCP peer.
    #[default]
    PeerAddress,
    /// First entry of `X-Forwarded-For`, falling back to the peer.
    XForwardedFor,
    /// `X-Real-IP`, falling back to the peer.
    XRealIp,
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum admitted requests per client per window.
    pub limit: u32,

    /// Trailing window length in milliseconds.
    pub window_ms: u64,

    /// Source of the client identity key.
    pub client_identity: ClientIdentitySource,

    /// How often idle clients are reaped, in milliseconds.
    pub sweep_interval_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: 100,
            window_ms: 60_000,
            client_identity: ClientIdentitySource::PeerAddress,
            sweep_interval_ms: 60_000,
        }
    }
}

/// Header forwarding policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HeaderPolicyConfig {
    /// When non-empty, only these headers are forwarded.
    pub allow: Vec<String>,

    /// Headers never forwarded to the backend.
    pub deny: Vec<String>,
}

impl Default for HeaderPolicyConfig {
    fn default() -> Self {
        Self {
            allow: Vec::new(),
            deny: [
                "connection",
                "keep-alive",
                "proxy-connection",
                "proxy-authenticate",
                "proxy-authorization",
                "te",
                "trailer",
                "transfer-encoding",
                "upgrade",
                "host",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
