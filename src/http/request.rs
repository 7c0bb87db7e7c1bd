//! Inbound request model.
//!
//! # Responsibilities
//! - Hold the transport-neutral view of one client request
//! - Build it from an axum request (method check, body limit)
//! - Generate a unique request ID for tracing
//!
//! # Design Decisions
//! - Body is buffered: rewriting needs the whole payload anyway
//! - `body_is_encoded` marks base64 transit bodies; they are decoded only
//!   when forwarded upstream
//! - The query string is kept in its wire form and forwarded byte for byte

use axum::{
    body::Body,
    http::{Method, Request},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::error::ProxyError;
use crate::security::HeaderSet;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Methods the proxy accepts.
pub const ALLOWED_METHODS: &[Method] = &[
    Method::GET,
    Method::HEAD,
    Method::OPTIONS,
    Method::POST,
    Method::PUT,
    Method::PATCH,
];

/// `Allow` value listing [`ALLOWED_METHODS`].
pub const ALLOWED_METHODS_HEADER: &str = "GET, HEAD, OPTIONS, POST, PUT, PATCH";

pub fn is_allowed_method(method: &Method) -> bool {
    ALLOWED_METHODS.contains(method)
}

/// One client request, independent of the transport it arrived on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRequest {
    pub method: Method,
    /// Path with leading slash, without query string.
    pub path: String,
    pub headers: HeaderSet,
    /// Raw query string, without the leading `?`.
    pub query: Option<String>,
    pub body: Option<Bytes>,
    /// True when `body` holds base64 text rather than raw bytes.
    pub body_is_encoded: bool,
}

impl InboundRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderSet::new(),
            query: None,
            body: None,
            body_is_encoded: false,
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Append a form-encoded `name=value` pair to the query string.
    pub fn with_query(mut self, name: &str, value: &str) -> Self {
        let query = url::form_urlencoded::Serializer::new(self.query.take().unwrap_or_default())
            .append_pair(name, value)
            .finish();
        self.query = Some(query);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self.body_is_encoded = false;
        self
    }

    /// Attach a base64 transit body.
    pub fn with_encoded_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self.body_is_encoded = true;
        self
    }

    /// The raw body, base64-decoded if it arrived encoded.
    pub fn raw_body(&self) -> Result<Option<Bytes>, base64::DecodeError> {
        match &self.body {
            Some(body) if self.body_is_encoded => STANDARD.decode(body).map(|b| Some(Bytes::from(b))),
            other => Ok(other.clone()),
        }
    }

    /// Buffer an axum request into an inbound request.
    pub async fn from_http(request: Request<Body>, max_body_size: usize) -> Result<Self, ProxyError> {
        let (parts, body) = request.into_parts();
        if !is_allowed_method(&parts.method) {
            return Err(ProxyError::MethodNotAllowed(parts.method));
        }

        let body = axum::body::to_bytes(body, max_body_size)
            .await
            .map_err(|_| ProxyError::BodyTooLarge {
                limit: max_body_size,
            })?;

        Ok(Self {
            method: parts.method,
            path: parts.uri.path().to_string(),
            headers: HeaderSet::from(&parts.headers),
            query: parts
                .uri
                .query()
                .filter(|q| !q.is_empty())
                .map(str::to_string),
            body: (!body.is_empty()).then_some(body),
            body_is_encoded: false,
        })
    }
}

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}
