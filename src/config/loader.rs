//! Configuration loading from disk and command-line overrides.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Invalid header name: {0}")]
    Header(#[from] axum::http::header::InvalidHeaderName),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Values supplied on the command line or through the environment.
/// Each one, when present, replaces the corresponding config field.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub upstream_url: Option<String>,
    pub port: Option<u16>,
    pub rate_limit: Option<u32>,
    pub rate_window_ms: Option<u64>,
}

impl ConfigOverrides {
    /// Apply the overrides on top of `config`.
    pub fn apply(&self, config: &mut GatewayConfig) {
        if let Some(url) = &self.upstream_url {
            config.upstream.base_url = url.clone();
        }
        if let Some(port) = self.port {
            config.listener.bind_address = match config.listener.bind_address.parse::<SocketAddr>() {
                Ok(mut addr) => {
                    addr.set_port(port);
                    addr.to_string()
                }
                Err(_) => format!("0.0.0.0:{}", port),
            };
        }
        if let Some(limit) = self.rate_limit {
            config.rate_limit.limit = limit;
        }
        if let Some(window_ms) = self.rate_window_ms {
            config.rate_limit.window_ms = window_ms;
        }
    }
}

/// Load and validate configuration from a TOML file, without overrides.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    resolve_config(Some(path), &ConfigOverrides::default())
}

/// Resolve the effective configuration: file (or defaults), then overrides,
/// then validation.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    overrides.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_fields() {
        let overrides = ConfigOverrides {
            upstream_url: Some("http://driver-service:8081".into()),
            port: Some(4000),
            rate_limit: Some(7),
            rate_window_ms: Some(1_000),
        };

        let config = resolve_config(None, &overrides).unwrap();
        assert_eq!(config.upstream.base_url, "http://driver-service:8081");
        assert_eq!(config.listener.bind_address, "0.0.0.0:4000");
        assert_eq!(config.rate_limit.limit, 7);
        assert_eq!(config.rate_limit.window_ms, 1_000);
    }

    #[test]
    fn test_invalid_override_fails_validation() {
        let overrides = ConfigOverrides {
            rate_limit: Some(0),
            ..Default::default()
        };

        match resolve_config(None, &overrides) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors, vec![ValidationError::ZeroLimit]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_config_from_file() {
        let path = std::env::temp_dir().join(format!("driver-gateway-{}.toml", std::process::id()));
        fs::write(
            &path,
            "[upstream]\nbase_url = \"http://10.0.0.5:8081\"\n[rate_limit]\nwindow_ms = 500\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(config.upstream.base_url, "http://10.0.0.5:8081");
        assert_eq!(config.rate_limit.window_ms, 500);
        assert_eq!(config.rate_limit.limit, 100);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_config(Path::new("/nonexistent/driver-gateway.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
