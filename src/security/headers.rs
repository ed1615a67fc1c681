//! Header forwarding policy.
//!
//! Decides which inbound request headers are copied onto the outbound
//! request. The deny list always applies; a non-empty allow list further
//! restricts forwarding to the names it contains.

use std::collections::HashSet;

use axum::http::{header::InvalidHeaderName, HeaderMap, HeaderName};

use crate::config::HeaderPolicyConfig;

#[derive(Debug, Clone)]
pub struct HeaderPolicy {
    allow: Option<HashSet<HeaderName>>,
    deny: HashSet<HeaderName>,
}

impl HeaderPolicy {
    pub fn from_config(config: &HeaderPolicyConfig) -> Result<Self, InvalidHeaderName> {
        let allow = if config.allow.is_empty() {
            None
        } else {
            Some(parse_names(&config.allow)?)
        };

        Ok(Self {
            allow,
            deny: parse_names(&config.deny)?,
        })
    }

    pub fn permits(&self, name: &HeaderName) -> bool {
        if self.deny.contains(name) {
            return false;
        }
        self.allow.as_ref().map_or(true, |allow| allow.contains(name))
    }

    /// Append every permitted header from `src` onto `dst`, keeping all
    /// values of multi-valued headers in order.
    pub fn copy(&self, src: &HeaderMap, dst: &mut HeaderMap) {
        for (name, value) in src.iter() {
            if self.permits(name) {
                dst.append(name.clone(), value.clone());
            }
        }
    }
}

fn parse_names(names: &[String]) -> Result<HashSet<HeaderName>, InvalidHeaderName> {
    names
        .iter()
        .map(|n| HeaderName::from_bytes(n.as_bytes()))
        .collect()
}
