//! Upstream forwarding with body rewriting.
//!
//! # Data Flow
//! ```text
//! InboundRequest
//!     → sanitize request headers
//!     → build {upstream_scheme}://{upstream_host}/{path}?{query}
//!     → decode transit body, call upstream
//!     → rewrite body (if the route has a rewriter)
//!     → sanitize response headers
//!     → OutboundResponse
//! ```

use std::sync::Arc;

use url::Url;

use crate::config::SiteConfig;
use crate::error::ProxyError;
use crate::http::{InboundRequest, OutboundResponse};
use crate::observability::metrics;
use crate::proxy::upstream::{Upstream, UpstreamRequest};
use crate::rewrite::BodyRewriter;
use crate::security::{sanitize_request_headers, sanitize_response_headers};

/// Sends requests to the single upstream host.
pub struct Forwarder {
    base: Url,
    upstream: Arc<dyn Upstream>,
}

impl std::fmt::Debug for Forwarder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forwarder").field("base", &self.base.as_str()).finish()
    }
}

impl Forwarder {
    pub fn new(site: &SiteConfig, upstream: Arc<dyn Upstream>) -> Result<Self, url::ParseError> {
        Ok(Self {
            base: Url::parse(&site.upstream_base())?,
            upstream,
        })
    }

    /// Upstream URL for an inbound path and raw query string.
    pub fn upstream_url(&self, path: &str, query: Option<&str>) -> Url {
        let mut url = self.base.clone();
        url.set_path(path);
        url.set_query(query);
        url
    }

    /// Forward `request` and rewrite the response body with `rewriter`.
    pub async fn forward(
        &self,
        request: InboundRequest,
        rewriter: Option<&dyn BodyRewriter>,
    ) -> Result<OutboundResponse, ProxyError> {
        let body = request.raw_body()?;
        let upstream_request = UpstreamRequest {
            url: self.upstream_url(&request.path, request.query.as_deref()),
            headers: sanitize_request_headers(&request.headers),
            method: request.method,
            body,
        };

        tracing::debug!(
            method = %upstream_request.method,
            url = %upstream_request.url,
            "Forwarding to upstream"
        );

        let response = self.upstream.send(upstream_request).await.map_err(|e| {
            metrics::record_upstream_error(e.kind());
            e
        })?;

        let body = match rewriter {
            Some(rewriter) => {
                let body = rewriter.rewrite(response.body)?;
                metrics::record_rewrite(rewriter.name());
                body
            }
            None => response.body,
        };

        Ok(OutboundResponse {
            status: response.status,
            headers: sanitize_response_headers(&response.headers),
            body: Some(body),
            body_is_encoded: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::upstream::testing::RecordingUpstream;
    use crate::proxy::upstream::UpstreamError;
    use crate::rewrite::{AssetRewriter, PageRewriter, LOGIN_REDIRECT_SCRIPT};
    use axum::http::{Method, StatusCode};
    use bytes::Bytes;

    fn forwarder(upstream: &Arc<RecordingUpstream>) -> Forwarder {
        Forwarder::new(&SiteConfig::default(), upstream.clone()).unwrap()
    }

    #[test]
    fn test_upstream_url() {
        let upstream = Arc::new(RecordingUpstream::new());
        let forwarder = forwarder(&upstream);

        assert_eq!(
            forwarder.upstream_url("/api/v3/getPage", None).as_str(),
            "https://vibeus.notion.site/api/v3/getPage"
        );
        assert_eq!(
            forwarder
                .upstream_url("/image/x", Some("table=block&w=a%20b"))
                .as_str(),
            "https://vibeus.notion.site/image/x?table=block&w=a%20b"
        );
        assert_eq!(
            forwarder.upstream_url("/image/x", Some("foo&bar=")).as_str(),
            "https://vibeus.notion.site/image/x?foo&bar="
        );
    }

    #[tokio::test]
    async fn test_forward_sanitizes_both_directions() {
        let upstream = Arc::new(RecordingUpstream::new().reply(
            StatusCode::OK,
            &[
                ("Content-Type", "application/json"),
                ("Content-Length", "2"),
                ("Content-Encoding", "gzip"),
                ("Content-Security-Policy", "default-src 'self'"),
            ],
            b"{}",
        ));
        let request = InboundRequest::new(Method::POST, "/api/v3/loadPage")
            .with_header("Host", "vibe.pub")
            .with_header("X-Forwarded-For", "1.2.3.4")
            .with_header("CloudFront-Viewer-Country", "DE")
            .with_header("Cookie", "token=1")
            .with_query("a", "1")
            .with_body("{\"pageId\":\"x\"}");

        let response = forwarder(&upstream).forward(request, None).await.unwrap();

        let requests = upstream.requests();
        let sent = &requests[0];
        assert_eq!(sent.method, Method::POST);
        assert_eq!(sent.url.as_str(), "https://vibeus.notion.site/api/v3/loadPage?a=1");
        assert_eq!(sent.headers.iter().collect::<Vec<_>>(), vec![("cookie", "token=1")]);
        assert_eq!(sent.body, Some(Bytes::from_static(b"{\"pageId\":\"x\"}")));

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.headers.iter().collect::<Vec<_>>(),
            vec![("content-type", "application/json")]
        );
        assert_eq!(response.body, Some(Bytes::from_static(b"{}")));
        assert!(!response.body_is_encoded);
    }

    #[tokio::test]
    async fn test_forward_decodes_transit_body() {
        let upstream = Arc::new(RecordingUpstream::new().reply(StatusCode::OK, &[], b""));
        let request = InboundRequest::new(Method::PUT, "/api/x").with_encoded_body("AP8Q");

        forwarder(&upstream).forward(request, None).await.unwrap();

        assert_eq!(
            upstream.requests()[0].body,
            Some(Bytes::from_static(&[0x00, 0xff, 0x10]))
        );
    }

    #[tokio::test]
    async fn test_forward_rejects_bad_transit_body() {
        let upstream = Arc::new(RecordingUpstream::new());
        let request = InboundRequest::new(Method::PUT, "/api/x").with_encoded_body("not base64!");

        let err = forwarder(&upstream).forward(request, None).await.unwrap_err();

        assert!(matches!(err, ProxyError::TransitDecode(_)));
        assert!(upstream.requests().is_empty());
    }

    #[tokio::test]
    async fn test_forward_applies_rewriters() {
        let upstream = Arc::new(
            RecordingUpstream::new()
                .reply(StatusCode::OK, &[], b"console.log(1);")
                .reply(StatusCode::OK, &[], b"x={domainBaseUrl:\"https://www.notion.so\"}"),
        );
        let forwarder = forwarder(&upstream);

        let asset = AssetRewriter::new();
        let response = forwarder
            .forward(InboundRequest::new(Method::GET, "/app-1.js"), Some(&asset))
            .await
            .unwrap();
        assert_eq!(
            response.body,
            Some(Bytes::from(format!("console.log(1);{LOGIN_REDIRECT_SCRIPT}")))
        );

        let page = PageRewriter::new("www.notion.so", "vibe.pub");
        let response = forwarder
            .forward(InboundRequest::new(Method::GET, "/page"), Some(&page))
            .await
            .unwrap();
        assert_eq!(
            response.body,
            Some(Bytes::from_static(b"x={domainBaseUrl:\"https://vibe.pub\"}"))
        );
    }

    #[tokio::test]
    async fn test_forward_keeps_upstream_status() {
        let upstream = Arc::new(RecordingUpstream::new().reply(
            StatusCode::NOT_FOUND,
            &[("Location", "https://www.notion.so/login")],
            b"missing",
        ));

        let response = forwarder(&upstream)
            .forward(InboundRequest::new(Method::GET, "/api/nope"), None)
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.headers.get("location"), Some("https://www.notion.so/login"));
    }

    #[tokio::test]
    async fn test_forward_propagates_upstream_errors() {
        let upstream = Arc::new(RecordingUpstream::new().fail(UpstreamError::Timeout));

        let err = forwarder(&upstream)
            .forward(InboundRequest::new(Method::GET, "/page"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, ProxyError::Upstream(UpstreamError::Timeout)));
    }

    #[tokio::test]
    async fn test_asset_decode_error_surfaces() {
        let upstream = Arc::new(RecordingUpstream::new().reply(StatusCode::OK, &[], &[0xff, 0xfe]));

        let err = forwarder(&upstream)
            .forward(
                InboundRequest::new(Method::GET, "/app.js"),
                Some(&AssetRewriter::new()),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ProxyError::Rewrite(_)));
    }
}
