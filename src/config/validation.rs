//! Configuration validation.
//!
//! Serde handles syntax; this checks value ranges and that the upstream URL
//! and header names are usable. All errors are collected, not just the first.

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("upstream.base_url `{url}` is invalid: {reason}")]
    BaseUrl { url: String, reason: String },

    #[error("upstream.base_url scheme `{0}` is not supported (only http)")]
    UnsupportedScheme(String),

    #[error("upstream.base_url must not carry a query or fragment")]
    BaseUrlSuffix,

    #[error("rate_limit.limit must be at least 1")]
    ZeroLimit,

    #[error("rate_limit.window_ms must be greater than 0")]
    ZeroWindow,

    #[error("rate_limit.sweep_interval_ms must be greater than 0")]
    ZeroSweepInterval,

    #[error("`{0}` is not a valid header name")]
    HeaderName(String),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),
}

/// Validate a configuration, returning every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    match Url::parse(&config.upstream.base_url) {
        Ok(url) => {
            if url.scheme() != "http" {
                errors.push(ValidationError::UnsupportedScheme(url.scheme().to_string()));
            }
            if url.query().is_some() || url.fragment().is_some() {
                errors.push(ValidationError::BaseUrlSuffix);
            }
        }
        Err(e) => errors.push(ValidationError::BaseUrl {
            url: config.upstream.base_url.clone(),
            reason: e.to_string(),
        }),
    }

    if config.rate_limit.limit == 0 {
        errors.push(ValidationError::ZeroLimit);
    }
    if config.rate_limit.window_ms == 0 {
        errors.push(ValidationError::ZeroWindow);
    }
    if config.rate_limit.sweep_interval_ms == 0 {
        errors.push(ValidationError::ZeroSweepInterval);
    }

    for name in config.headers.allow.iter().chain(config.headers.deny.iter()) {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::HeaderName(name.clone()));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = GatewayConfig::default();
        config.rate_limit.limit = 0;
        config.rate_limit.window_ms = 0;
        config.upstream.base_url = "https://drivers.internal".into();
        config.headers.deny.push("bad header".into());

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::ZeroLimit));
        assert!(errors.contains(&ValidationError::ZeroWindow));
        assert!(errors.contains(&ValidationError::UnsupportedScheme("https".into())));
        assert!(errors.contains(&ValidationError::HeaderName("bad header".into())));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_rejects_unparseable_base_url() {
        let mut config = GatewayConfig::default();
        config.upstream.base_url = "localhost:8081".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_rejects_base_url_with_query() {
        let mut config = GatewayConfig::default();
        config.upstream.base_url = "http://localhost:8081/?x=1".into();
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::BaseUrlSuffix])
        );
    }
}
