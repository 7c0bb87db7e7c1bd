//! Request pipeline.
//!
//! # Data Flow
//! ```text
//! InboundRequest
//!     → routing (method + path → RouteDecision)
//!     → Redirect   → OutboundResponse (no upstream)
//!     → Preflight  → http::preflight (no upstream)
//!     → RewriteAsset / RewritePage / PassThrough
//!         → forwarder.rs → upstream.rs → OutboundResponse
//! ```
//!
//! # Design Decisions
//! - Stateless: nothing survives a request except the shared, immutable tables
//! - Failures become minimal error responses; details go to the log only

pub mod forwarder;
pub mod upstream;

use std::sync::Arc;
use std::time::Instant;

use crate::config::SiteConfig;
use crate::http::preflight::preflight_response;
use crate::http::{InboundRequest, OutboundResponse};
use crate::observability::metrics;
use crate::routing::{RouteDecision, Router};

pub use forwarder::Forwarder;
pub use upstream::{HttpUpstream, Upstream, UpstreamError, UpstreamRequest, UpstreamResponse};

/// Routes each request and produces its response.
#[derive(Debug)]
pub struct Proxy {
    router: Router,
    forwarder: Forwarder,
}

impl Proxy {
    pub fn new(site: &SiteConfig, upstream: Arc<dyn Upstream>) -> Result<Self, url::ParseError> {
        Ok(Self {
            router: Router::from_config(site)?,
            forwarder: Forwarder::new(site, upstream)?,
        })
    }

    /// Handle one request end to end. Never fails: errors become responses.
    pub async fn handle(&self, request: InboundRequest) -> OutboundResponse {
        let start = Instant::now();
        let method = request.method.clone();
        let route = self.router.route(&request.method, &request.path);

        tracing::debug!(
            method = %method,
            path = %request.path,
            route = route.name(),
            "Routing request"
        );

        let result = match route.decision() {
            RouteDecision::Redirect { target, status } => {
                Ok(OutboundResponse::redirect(*status, target.as_str()))
            }
            RouteDecision::Preflight => Ok(preflight_response(&request.headers)),
            decision => self.forwarder.forward(request, decision.rewriter()).await,
        };

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                if e.status().is_server_error() {
                    tracing::error!(route = route.name(), error = %e, "Request failed");
                } else {
                    tracing::warn!(route = route.name(), error = %e, "Request rejected");
                }
                e.into()
            }
        };

        metrics::record_request(method.as_str(), response.status.as_u16(), route.name(), start);
        response
    }
}
