//! Route matching logic.
//!
//! # Responsibilities
//! - Match request method (exact)
//! - Match normalized path: exact, any-of prefixes, prefix + suffix
//!
//! # Design Decisions
//! - Matchers see only method and path, never headers or body
//! - Paths are normalized first: leading slash removed, query/fragment cut
//! - Plain string comparison; no regex

use axum::http::Method;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    ///
    /// `path` is already normalized by [`route_path`].
    fn matches(&self, method: &Method, path: &str) -> bool;
}

/// Strip the leading slash and any query or fragment from `path`.
pub fn route_path(path: &str) -> &str {
    let path = path
        .find(|c: char| c == '?' || c == '#')
        .map_or(path, |end| &path[..end]);
    path.strip_prefix('/').unwrap_or(path)
}

/// Matches one request method.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    method: Method,
}

impl MethodMatcher {
    pub fn new(method: Method) -> Self {
        Self { method }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, method: &Method, _path: &str) -> bool {
        *method == self.method
    }
}

/// Matches one exact path.
#[derive(Debug, Clone)]
pub struct ExactPathMatcher {
    path: String,
}

impl ExactPathMatcher {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Matcher for ExactPathMatcher {
    fn matches(&self, _method: &Method, path: &str) -> bool {
        path == self.path
    }
}

/// Matches if the path starts with any of the prefixes.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefixes: Vec<String>,
}

impl PathPrefixMatcher {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, _method: &Method, path: &str) -> bool {
        self.prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }
}

/// Matches paths with a given prefix and suffix, e.g. `app*.js`.
#[derive(Debug, Clone)]
pub struct AffixMatcher {
    prefix: String,
    suffix: String,
}

impl AffixMatcher {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }
}

impl Matcher for AffixMatcher {
    fn matches(&self, _method: &Method, path: &str) -> bool {
        path.starts_with(self.prefix.as_str()) && path.ends_with(self.suffix.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_path() {
        assert_eq!(route_path("/"), "");
        assert_eq!(route_path("/app-1.js?v=2"), "app-1.js");
        assert_eq!(route_path("/page#section"), "page");
        assert_eq!(route_path("api/v3"), "api/v3");
        assert_eq!(route_path("//double"), "/double");
    }

    #[test]
    fn test_method_matcher() {
        let matcher = MethodMatcher::new(Method::OPTIONS);
        assert!(matcher.matches(&Method::OPTIONS, "anything"));
        assert!(!matcher.matches(&Method::GET, "anything"));
    }

    #[test]
    fn test_prefix_matcher() {
        let matcher = PathPrefixMatcher::new(["api/", "image/"]);
        assert!(matcher.matches(&Method::GET, "api/v3/getPage"));
        assert!(matcher.matches(&Method::POST, "image/https%3A%2F%2Fx.png"));
        assert!(!matcher.matches(&Method::GET, "apis"));
        assert!(!matcher.matches(&Method::GET, "page/api/"));
    }

    #[test]
    fn test_affix_matcher() {
        let matcher = AffixMatcher::new("app", ".js");
        assert!(matcher.matches(&Method::GET, "app-abc123.js"));
        assert!(matcher.matches(&Method::GET, "app.js"));
        assert!(!matcher.matches(&Method::GET, "app-abc123.js.map"));
        assert!(!matcher.matches(&Method::GET, "vendor-app.js"));
    }
}
