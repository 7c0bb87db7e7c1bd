//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Hold the ordered routing table built from the site configuration
//! - Classify a request (method + path) into exactly one decision
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - First match wins; a fallback route makes lookup total
//! - Rewriters are built once and shared by every request

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use url::Url;

use crate::config::SiteConfig;
use crate::rewrite::{AssetRewriter, BodyRewriter, PageRewriter};
use crate::routing::matcher::{
    route_path, AffixMatcher, ExactPathMatcher, Matcher, MethodMatcher, PathPrefixMatcher,
};

/// Path prefixes whose payloads are API or binary data and pass untouched.
pub const PASSTHROUGH_PREFIXES: [&str; 3] = ["api/", "image/", "images/"];

/// What to do with a request.
#[derive(Debug, Clone)]
pub enum RouteDecision {
    /// Answer with a redirect, no upstream call.
    Redirect { target: Url, status: StatusCode },
    /// Answer a CORS preflight locally.
    Preflight,
    /// Forward and append the login-redirect script.
    RewriteAsset(Arc<AssetRewriter>),
    /// Forward and substitute the base domain.
    RewritePage(Arc<PageRewriter>),
    /// Forward without touching the body.
    PassThrough,
}

impl RouteDecision {
    /// Body rewriter to apply to the upstream response, if any.
    pub fn rewriter(&self) -> Option<&dyn BodyRewriter> {
        match self {
            RouteDecision::RewriteAsset(r) => Some(r.as_ref()),
            RouteDecision::RewritePage(r) => Some(r.as_ref()),
            _ => None,
        }
    }
}

/// A named entry of the routing table.
#[derive(Debug)]
pub struct Route {
    name: &'static str,
    matcher: Option<Box<dyn Matcher>>,
    decision: RouteDecision,
}

impl Route {
    fn new(name: &'static str, matcher: impl Matcher + 'static, decision: RouteDecision) -> Self {
        Self {
            name,
            matcher: Some(Box::new(matcher)),
            decision,
        }
    }

    fn fallback(name: &'static str, decision: RouteDecision) -> Self {
        Self {
            name,
            matcher: None,
            decision,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn decision(&self) -> &RouteDecision {
        &self.decision
    }

    fn matches(&self, method: &Method, path: &str) -> bool {
        self.matcher
            .as_ref()
            .map_or(true, |m| m.matches(method, path))
    }
}

/// Ordered routing table.
#[derive(Debug)]
pub struct Router {
    routes: Vec<Route>,
    fallback: Route,
}

impl Router {
    /// Build the routing table for a site.
    ///
    /// Order: preflight, root redirect, passthrough prefixes, app bundle,
    /// then every other page.
    pub fn from_config(site: &SiteConfig) -> Result<Self, url::ParseError> {
        let target = Url::parse(&site.root_redirect_target())?;
        let status = match site.redirect_status {
            301 => StatusCode::MOVED_PERMANENTLY,
            _ => StatusCode::FOUND,
        };

        let mut asset = AssetRewriter::new();
        if site.rewrite_asset_hosts {
            asset = asset.with_host_substitution(&site.upstream_canonical_host, &site.public_domain);
        }
        let page = PageRewriter::new(&site.upstream_canonical_host, &site.public_domain);

        let routes = vec![
            Route::new(
                "preflight",
                MethodMatcher::new(Method::OPTIONS),
                RouteDecision::Preflight,
            ),
            Route::new(
                "root",
                ExactPathMatcher::new(""),
                RouteDecision::Redirect { target, status },
            ),
            Route::new(
                "passthrough",
                PathPrefixMatcher::new(PASSTHROUGH_PREFIXES),
                RouteDecision::PassThrough,
            ),
            Route::new(
                "asset",
                AffixMatcher::new("app", ".js"),
                RouteDecision::RewriteAsset(Arc::new(asset)),
            ),
        ];

        Ok(Self {
            routes,
            fallback: Route::fallback("page", RouteDecision::RewritePage(Arc::new(page))),
        })
    }

    /// Find the route for a request. Always returns a route.
    pub fn route(&self, method: &Method, path: &str) -> &Route {
        let path = route_path(path);
        self.routes
            .iter()
            .find(|r| r.matches(method, path))
            .unwrap_or(&self.fallback)
    }

    /// Shorthand for `route(..).decision()`.
    pub fn decide(&self, method: &Method, path: &str) -> &RouteDecision {
        self.route(method, path).decision()
    }

    /// All routes in evaluation order, fallback last.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter().chain(std::iter::once(&self.fallback))
    }
}
