//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (HeaderRuleSet::INBOUND: drop host/via/referer/x-*/cloudfront*)
//!     → Upstream
//!
//! Upstream response:
//!     → headers.rs (HeaderRuleSet::OUTBOUND: drop length/encoding/CSP)
//!     → Client
//! ```
//!
//! # Design Decisions
//! - No infrastructure metadata leaks to upstream
//! - Exclusion rules are constants of the system

pub mod headers;

pub use headers::{
    is_hop_by_hop, sanitize_request_headers, sanitize_response_headers, HeaderRuleSet, HeaderSet,
};
