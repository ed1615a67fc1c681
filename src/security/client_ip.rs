//! Client identity resolution for rate limiting.
//!
//! The identity source is chosen in config. Header-based sources are only
//! trustworthy when the gateway sits behind a proxy that overwrites them;
//! otherwise a client can pick its own bucket.

use std::net::{IpAddr, SocketAddr};

use axum::{extract::ConnectInfo, http::Request};

use crate::config::ClientIdentitySource;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Identity used when the peer address is not available.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Resolves the key a request is rate limited under.
#[derive(Debug, Clone, Copy)]
pub struct ClientIdentity {
    source: ClientIdentitySource,
}

impl ClientIdentity {
    pub fn new(source: ClientIdentitySource) -> Self {
        Self { source }
    }

    pub fn resolve<B>(&self, request: &Request<B>) -> String {
        let from_header = match self.source {
            ClientIdentitySource::PeerAddress => None,
            ClientIdentitySource::XForwardedFor => header_ip(request, X_FORWARDED_FOR, |v| {
                v.split(',').next().unwrap_or_default()
            }),
            ClientIdentitySource::XRealIp => header_ip(request, X_REAL_IP, |v| v),
        };

        from_header
            .or_else(|| peer_ip(request))
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
    }
}

fn peer_ip<B>(request: &Request<B>) -> Option<IpAddr> {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}

fn header_ip<B>(request: &Request<B>, name: &str, pick: impl Fn(&str) -> &str) -> Option<IpAddr> {
    request
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| pick(v).trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().uri("/drivers");
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        let mut req = builder.body(()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo("192.168.1.10:5555".parse::<SocketAddr>().unwrap()));
        req
    }

    #[test]
    fn test_peer_address_ignores_headers() {
        let identity = ClientIdentity::new(ClientIdentitySource::PeerAddress);
        let req = request(&[("x-forwarded-for", "1.2.3.4")]);
        assert_eq!(identity.resolve(&req), "192.168.1.10");
    }

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let identity = ClientIdentity::new(ClientIdentitySource::XForwardedFor);
        let req = request(&[("x-forwarded-for", " 1.2.3.4 , 10.0.0.1")]);
        assert_eq!(identity.resolve(&req), "1.2.3.4");
    }

    #[test]
    fn test_garbage_header_falls_back_to_peer() {
        let identity = ClientIdentity::new(ClientIdentitySource::XForwardedFor);
        let req = request(&[("x-forwarded-for", "not-an-ip")]);
        assert_eq!(identity.resolve(&req), "192.168.1.10");

        let identity = ClientIdentity::new(ClientIdentitySource::XRealIp);
        let req = request(&[]);
        assert_eq!(identity.resolve(&req), "192.168.1.10");
    }

    #[test]
    fn test_real_ip() {
        let identity = ClientIdentity::new(ClientIdentitySource::XRealIp);
        let req = request(&[("x-real-ip", "2001:db8::1")]);
        assert_eq!(identity.resolve(&req), "2001:db8::1");
    }

    #[test]
    fn test_no_peer_is_unknown() {
        let identity = ClientIdentity::new(ClientIdentitySource::PeerAddress);
        let req = Request::builder().body(()).unwrap();
        assert_eq!(identity.resolve(&req), UNKNOWN_CLIENT);
    }
}
