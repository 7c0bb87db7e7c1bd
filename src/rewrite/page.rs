//! Base-domain substitution for rendered pages.

use bytes::Bytes;

use super::{BodyRewriter, RewriteError, Substitution};

/// Rewrites the upstream's `domainBaseUrl` assignment to the public domain.
#[derive(Debug, Clone)]
pub struct PageRewriter {
    substitution: Substitution,
}

impl PageRewriter {
    pub fn new(upstream_canonical_host: &str, public_domain: &str) -> Self {
        Self {
            substitution: Substitution::new(
                format!("domainBaseUrl:\"https://{upstream_canonical_host}\""),
                format!("domainBaseUrl:\"https://{public_domain}\""),
            ),
        }
    }
}

impl BodyRewriter for PageRewriter {
    fn name(&self) -> &'static str {
        "page"
    }

    /// Bodies without the literal, and bodies that are not text, come back unchanged.
    fn rewrite(&self, body: Bytes) -> Result<Bytes, RewriteError> {
        let rewritten = match std::str::from_utf8(&body) {
            Ok(text) => self.substitution.apply(text),
            Err(_) => {
                tracing::trace!(len = body.len(), "Skipping substitution for non-UTF-8 body");
                None
            }
        };
        Ok(rewritten.map(Bytes::from).unwrap_or(body))
    }
}
