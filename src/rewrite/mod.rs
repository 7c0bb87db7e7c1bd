//! Response body rewriting.
//!
//! # Data Flow
//! ```text
//! Upstream body (bytes)
//!     → asset.rs (app*.js: append login-redirect script)
//!     → page.rs  (other pages: point domainBaseUrl at the public domain)
//!     → Client body (bytes)
//! ```
//!
//! # Design Decisions
//! - Rewriters are pure: bytes in, bytes out, no state between requests
//! - The asset must decode as UTF-8; shipping it without the script is a defect
//! - Page substitution is best-effort and never fails

pub mod asset;
pub mod page;

use bytes::Bytes;

pub use asset::{AssetRewriter, LOGIN_REDIRECT_SCRIPT};
pub use page::PageRewriter;

/// Errors produced while rewriting a body.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error("response body is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
}

/// A transformation applied to an upstream response body.
pub trait BodyRewriter: Send + Sync + std::fmt::Debug {
    /// Short identifier for logs and metrics.
    fn name(&self) -> &'static str;

    fn rewrite(&self, body: Bytes) -> Result<Bytes, RewriteError>;
}

/// Literal replacement of every occurrence of `from` with `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    from: String,
    to: String,
}

impl Substitution {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Returns `None` when `text` does not contain the target literal.
    pub fn apply(&self, text: &str) -> Option<String> {
        if self.from.is_empty() || !text.contains(&self.from) {
            return None;
        }
        Some(text.replace(&self.from, &self.to))
    }
}
