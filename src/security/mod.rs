//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming forward-route request:
//!     → client_ip.rs (resolve the identity key)
//!     → rate_limit.rs (admit or 429)
//!     → window_store.rs (per-client sliding window)
//!     → Pass to forwarder
//!         → headers.rs (filter headers copied upstream)
//! ```
//!
//! # Design Decisions
//! - Identity source is explicit configuration, peer address by default
//! - Per-key locking: unrelated clients never serialize on one lock
//! - Idle windows are reaped by a background sweep

pub mod client_ip;
pub mod headers;
pub mod rate_limit;
pub mod window_store;

pub use client_ip::ClientIdentity;
pub use headers::HeaderPolicy;
pub use rate_limit::RateLimiter;
pub use window_store::ClientWindowStore;
