//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace span)
//!     → [routing layer classifies the request]
//!     → [rate limiter admits or rejects]
//!     → forward.rs (build outbound request, relay response)
//!     → Send to client
//! ```

pub mod forward;
pub mod request;
pub mod server;

pub use forward::Forwarder;
pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
