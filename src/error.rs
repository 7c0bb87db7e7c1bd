//! Error types shared across the pipeline.
//!
//! Every failure reaching the client becomes a status code plus its reason
//! phrase. Details (upstream URLs, decode positions) only go to the logs.

use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::http::request::ALLOWED_METHODS_HEADER;
use crate::http::response::OutboundResponse;
use crate::proxy::upstream::UpstreamError;
use crate::rewrite::RewriteError;

/// Per-request failures.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("upstream request failed: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("failed to rewrite response body: {0}")]
    Rewrite(#[from] RewriteError),

    #[error("request body is not valid base64: {0}")]
    TransitDecode(#[from] base64::DecodeError),

    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("method {0} is not allowed")]
    MethodNotAllowed(Method),

    #[error("malformed method {0:?}")]
    InvalidMethod(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Upstream(e) => e.status(),
            ProxyError::Rewrite(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::TransitDecode(_) => StatusCode::BAD_REQUEST,
            ProxyError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::MethodNotAllowed(_) | ProxyError::InvalidMethod(_) => {
                StatusCode::METHOD_NOT_ALLOWED
            }
        }
    }
}

impl From<ProxyError> for OutboundResponse {
    fn from(error: ProxyError) -> Self {
        let response = OutboundResponse::error(error.status());
        match error {
            ProxyError::MethodNotAllowed(_) | ProxyError::InvalidMethod(_) => {
                response.with_header("Allow", ALLOWED_METHODS_HEADER)
            }
            _ => response,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        OutboundResponse::from(self).into_response()
    }
}

/// Failures while assembling the server at startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid site URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to build upstream client: {0}")]
    Client(#[source] UpstreamError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ProxyError::Upstream(UpstreamError::Timeout).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ProxyError::Upstream(UpstreamError::Connect("refused".into())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ProxyError::BodyTooLarge { limit: 1 }.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn test_response_hides_details() {
        let error = ProxyError::Upstream(UpstreamError::Transport(
            "error sending request for url (https://vibeus.notion.site/secret)".into(),
        ));
        let response = OutboundResponse::from(error);

        assert_eq!(response.status, StatusCode::BAD_GATEWAY);
        assert_eq!(response.body, Some(Bytes::from_static(b"Bad Gateway")));
        assert!(response.headers.iter().all(|(_, v)| !v.contains("notion")));
    }

    #[test]
    fn test_method_not_allowed_lists_methods() {
        let response = OutboundResponse::from(ProxyError::MethodNotAllowed(Method::DELETE));
        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response.headers.get("allow"),
            Some("GET, HEAD, OPTIONS, POST, PUT, PATCH")
        );
    }
}
