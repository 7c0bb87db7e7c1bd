//! Outbound response model.
//!
//! # Responsibilities
//! - Hold the transport-neutral view of one client response
//! - Convert into an axum response (hop-by-hop headers stripped)
//! - Switch the body to base64 for text-only transit channels
//!
//! # Design Decisions
//! - Error responses carry only the status reason phrase
//! - `body_is_encoded` always tells the truth about `body`

use axum::{
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;

use crate::security::{is_hop_by_hop, HeaderSet};

/// One client response, independent of the transport it leaves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundResponse {
    pub status: StatusCode,
    pub headers: HeaderSet,
    pub body: Option<Bytes>,
    /// True when `body` holds base64 text rather than raw bytes.
    pub body_is_encoded: bool,
}

impl OutboundResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderSet::new(),
            body: None,
            body_is_encoded: false,
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self.body_is_encoded = false;
        self
    }

    /// Empty-bodied redirect to `location`.
    pub fn redirect(status: StatusCode, location: &str) -> Self {
        Self::new(status).with_header("Location", location)
    }

    /// Minimal error response: the reason phrase and nothing else.
    pub fn error(status: StatusCode) -> Self {
        Self::new(status)
            .with_header("Content-Type", "text/plain; charset=utf-8")
            .with_body(status.canonical_reason().unwrap_or("Error"))
    }

    /// Base64-encode the body for a text-only transit channel.
    pub fn into_transit_encoded(mut self) -> Self {
        if !self.body_is_encoded {
            if let Some(body) = self.body.take() {
                self.body = Some(Bytes::from(STANDARD.encode(&body)));
                self.body_is_encoded = true;
            }
        }
        self
    }

    /// The raw body, base64-decoded if it is transit-encoded.
    pub fn raw_body(&self) -> Result<Option<Bytes>, base64::DecodeError> {
        match &self.body {
            Some(body) if self.body_is_encoded => STANDARD.decode(body).map(|b| Some(Bytes::from(b))),
            other => Ok(other.clone()),
        }
    }
}

impl IntoResponse for OutboundResponse {
    fn into_response(self) -> Response {
        let body = match self.raw_body() {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "Response body is not valid base64");
                return OutboundResponse::error(StatusCode::INTERNAL_SERVER_ERROR).into_response();
            }
        };

        let mut headers = self.headers;
        headers.retain(|name, _| !is_hop_by_hop(name));

        let mut response = Response::new(body.map(Body::from).unwrap_or_else(Body::empty));
        *response.status_mut() = self.status;
        *response.headers_mut() = headers.to_header_map();
        response
    }
}
