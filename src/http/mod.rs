//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware layers)
//!     → request.rs (method check, body buffering, query parsing)
//!     → proxy pipeline (routing, preflight, forwarding)
//!     → response.rs (transit decoding, hop-by-hop cleanup)
//!     → Send to client
//! ```

pub mod preflight;
pub mod request;
pub mod response;
pub mod server;

pub use request::{InboundRequest, MakeRequestUuid, ALLOWED_METHODS, X_REQUEST_ID};
pub use response::OutboundResponse;
pub use server::HttpServer;
