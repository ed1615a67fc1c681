//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (static route table)
//!     → GET /health        → answered locally
//!     → /drivers routes    → rate limiter → forwarder
//!     → anything else      → 404
//! ```
//!
//! # Design Decisions
//! - The table is fixed at compile time
//! - Paths and queries are never rewritten, normalized or decoded

pub mod router;

pub use router::{build_router, classify, RouteAction, ROUTES};
