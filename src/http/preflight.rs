//! CORS preflight handling.
//!
//! OPTIONS requests are answered locally; upstream is never contacted.

use axum::http::StatusCode;

use crate::http::response::OutboundResponse;
use crate::security::HeaderSet;

/// Methods advertised in `Allow` and `Access-Control-Allow-Methods`.
pub const ADVERTISED_METHODS: &str = "GET, HEAD, POST, PUT, OPTIONS";

const PREFLIGHT_HEADERS: [&str; 3] = [
    "origin",
    "access-control-request-method",
    "access-control-request-headers",
];

/// True if `headers` carry everything a CORS preflight needs.
pub fn is_cors_preflight(headers: &HeaderSet) -> bool {
    PREFLIGHT_HEADERS.iter().all(|name| headers.contains(name))
}

/// Answer an OPTIONS request.
///
/// A full CORS preflight gets the permissive CORS grant, anything else a
/// plain `Allow` listing. Both have an empty body.
pub fn preflight_response(headers: &HeaderSet) -> OutboundResponse {
    if is_cors_preflight(headers) {
        OutboundResponse::new(StatusCode::OK)
            .with_header("Access-Control-Allow-Origin", "*")
            .with_header("Access-Control-Allow-Methods", ADVERTISED_METHODS)
            .with_header("Access-Control-Allow-Headers", "Content-Type")
    } else {
        OutboundResponse::new(StatusCode::OK).with_header("Allow", ADVERTISED_METHODS)
    }
}
