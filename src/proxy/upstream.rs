//! Upstream HTTP client.
//!
//! # Responsibilities
//! - Issue one call per forwarded request, with connect and total deadlines
//! - Classify failures (timeout vs connection vs other)
//!
//! # Design Decisions
//! - No retries, no caching
//! - Redirects are not followed; 3xx goes back to the client as-is
//! - Environment proxy settings are ignored; calls go straight to the host
//! - Hop-by-hop and length headers are left to the client library

use std::time::Duration;

use axum::http::{HeaderMap, Method, StatusCode};
use bytes::Bytes;
use futures_util::future::BoxFuture;
use url::Url;

use crate::config::TimeoutConfig;
use crate::security::{is_hop_by_hop, HeaderSet};

/// A request ready to be sent upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderSet,
    pub body: Option<Bytes>,
}

/// The upstream's answer, fully buffered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderSet,
    pub body: Bytes,
}

/// Upstream call failures.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream timed out")]
    Timeout,

    #[error("could not connect to upstream: {0}")]
    Connect(String),

    #[error("upstream transport error: {0}")]
    Transport(String),

    #[error("invalid upstream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl UpstreamError {
    /// Gateway status reported to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            UpstreamError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_GATEWAY,
        }
    }

    /// Label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Timeout => "timeout",
            UpstreamError::Connect(_) => "connect",
            UpstreamError::Transport(_) => "transport",
            UpstreamError::InvalidUrl(_) => "invalid_url",
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            UpstreamError::Timeout
        } else if e.is_connect() {
            UpstreamError::Connect(e.to_string())
        } else {
            UpstreamError::Transport(e.to_string())
        }
    }
}

/// The outbound side of the proxy.
pub trait Upstream: Send + Sync {
    fn send(&self, request: UpstreamRequest) -> BoxFuture<'_, Result<UpstreamResponse, UpstreamError>>;
}

/// [`Upstream`] backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
}

impl HttpUpstream {
    pub fn new(timeouts: &TimeoutConfig) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.upstream_secs))
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()?;
        Ok(Self { client })
    }

    async fn execute(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(client_headers(request.headers));
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = HeaderSet::from(response.headers());
        let body = response.bytes().await?;

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

impl Upstream for HttpUpstream {
    fn send(&self, request: UpstreamRequest) -> BoxFuture<'_, Result<UpstreamResponse, UpstreamError>> {
        Box::pin(self.execute(request))
    }
}

/// Headers the client library computes itself are removed.
fn client_headers(mut headers: HeaderSet) -> HeaderMap {
    headers.retain(|name, _| !is_hop_by_hop(name) && name != "content-length");
    headers.to_header_map()
}
