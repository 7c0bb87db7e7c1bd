//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → matcher.rs (normalize path, evaluate conditions)
//!     → router.rs (first matching route, fallback last)
//!     → Return: RouteDecision
//!
//! Route Compilation (at startup):
//!     SiteConfig
//!     → Build rewriters and redirect target
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix/suffix matching only)
//! - Deterministic: same method and path always yield the same decision
//! - Headers and body never influence routing

pub mod matcher;
pub mod router;

pub use router::{Route, RouteDecision, Router, PASSTHROUGH_PREFIXES};
