//! Function-gateway event surface.
//!
//! # Data Flow
//! ```text
//! GatewayEvent (JSON)
//!     → InboundRequest (base64 bodies stay encoded until forwarding)
//!     → Proxy::handle
//!     → OutboundResponse (body always transit-encoded)
//!     → GatewayResponse (JSON)
//! ```
//!
//! # Design Decisions
//! - Same pipeline as the HTTP server; only the envelope differs
//! - Repeated response headers go to `multiValueHeaders`, the rest to `headers`

use std::collections::BTreeMap;

use axum::http::Method;
use serde::{Deserialize, Serialize};

use crate::error::ProxyError;
use crate::http::request::is_allowed_method;
use crate::http::{InboundRequest, OutboundResponse};
use crate::proxy::Proxy;

/// An HTTP request as delivered by the function gateway.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayEvent {
    pub http_method: String,
    pub path: String,
    pub headers: Option<BTreeMap<String, String>>,
    pub query_string_parameters: Option<BTreeMap<String, String>>,
    pub body: Option<String>,
    pub is_base64_encoded: Option<bool>,
}

impl GatewayEvent {
    /// Convert to the pipeline's request model.
    pub fn into_inbound(self) -> Result<InboundRequest, ProxyError> {
        let method = Method::from_bytes(self.http_method.to_ascii_uppercase().as_bytes())
            .map_err(|_| ProxyError::InvalidMethod(self.http_method.clone()))?;
        if !is_allowed_method(&method) {
            return Err(ProxyError::MethodNotAllowed(method));
        }

        let path = if self.path.starts_with('/') {
            self.path
        } else {
            format!("/{}", self.path)
        };

        let mut request = InboundRequest::new(method, path);
        for (name, value) in self.headers.unwrap_or_default() {
            request = request.with_header(&name, value);
        }
        for (name, value) in self.query_string_parameters.unwrap_or_default() {
            request = request.with_query(&name, &value);
        }
        request = match self.body {
            Some(body) if body.is_empty() => request,
            Some(body) if self.is_base64_encoded.unwrap_or(false) => request.with_encoded_body(body),
            Some(body) => request.with_body(body),
            None => request,
        };
        Ok(request)
    }
}

/// The gateway's response envelope.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub multi_value_headers: BTreeMap<String, Vec<String>>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl From<OutboundResponse> for GatewayResponse {
    fn from(response: OutboundResponse) -> Self {
        let response = response.into_transit_encoded();

        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in &response.headers.to_header_map() {
            grouped
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }
        let mut headers = BTreeMap::new();
        let mut multi_value_headers = BTreeMap::new();
        for (name, mut values) in grouped {
            if values.len() == 1 {
                headers.insert(name, values.remove(0));
            } else {
                multi_value_headers.insert(name, values);
            }
        }

        let body = response
            .body
            .map(|b| String::from_utf8_lossy(&b).into_owned())
            .unwrap_or_default();

        Self {
            status_code: response.status.as_u16(),
            headers,
            multi_value_headers,
            is_base64_encoded: response.body_is_encoded,
            body,
        }
    }
}

/// Run one gateway event through the proxy.
pub async fn handle_event(proxy: &Proxy, event: GatewayEvent) -> GatewayResponse {
    let response = match event.into_inbound() {
        Ok(request) => proxy.handle(request).await,
        Err(e) => {
            tracing::warn!(error = %e, "Gateway event rejected");
            OutboundResponse::from(e)
        }
    };
    GatewayResponse::from(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::proxy::upstream::testing::RecordingUpstream;
    use crate::rewrite::LOGIN_REDIRECT_SCRIPT;
    use axum::http::StatusCode;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use bytes::Bytes;
    use std::sync::Arc;

    fn proxy(upstream: &Arc<RecordingUpstream>) -> Proxy {
        Proxy::new(&SiteConfig::default(), upstream.clone()).unwrap()
    }

    #[test]
    fn test_event_deserializes() {
        let event: GatewayEvent = serde_json::from_str(
            r#"{
                "httpMethod": "POST",
                "path": "/api/v3/getPublicPageData",
                "headers": {"Content-Type": "application/json", "Host": "vibe.pub"},
                "queryStringParameters": null,
                "body": "eyJhIjoxfQ==",
                "isBase64Encoded": true
            }"#,
        )
        .unwrap();

        let request = event.into_inbound().unwrap();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.headers.get("content-type"), Some("application/json"));
        assert!(request.body_is_encoded);
        assert_eq!(request.raw_body().unwrap(), Some(Bytes::from_static(b"{\"a\":1}")));
    }

    #[test]
    fn test_null_fields_fall_back_to_defaults() {
        let event: GatewayEvent = serde_json::from_str(
            r#"{
                "httpMethod": "GET",
                "path": "/somepage",
                "headers": null,
                "queryStringParameters": null,
                "body": null,
                "isBase64Encoded": null
            }"#,
        )
        .unwrap();

        let request = event.into_inbound().unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, "/somepage");
        assert!(request.headers.is_empty());
        assert_eq!(request.query, None);
        assert_eq!(request.body, None);
        assert!(!request.body_is_encoded);
    }

    #[test]
    fn test_query_parameters_are_encoded() {
        let event = GatewayEvent {
            http_method: "GET".into(),
            path: "image/x.png".into(),
            query_string_parameters: Some(BTreeMap::from([
                ("table".to_string(), "block".to_string()),
                ("w".to_string(), "a b&c".to_string()),
            ])),
            ..GatewayEvent::default()
        };

        let request = event.into_inbound().unwrap();
        assert_eq!(request.path, "/image/x.png");
        assert_eq!(request.query.as_deref(), Some("table=block&w=a+b%26c"));
    }

    #[test]
    fn test_response_header_bytes_decode_as_utf8() {
        let mut upstream = axum::http::HeaderMap::new();
        upstream.insert(
            "content-disposition",
            axum::http::HeaderValue::from_bytes("inline; filename=\"r\u{e9}sum\u{e9}.pdf\"".as_bytes())
                .unwrap(),
        );
        let mut response = OutboundResponse::new(StatusCode::OK);
        response.headers = crate::security::HeaderSet::from(&upstream);

        let gateway = GatewayResponse::from(response);
        assert_eq!(
            gateway.headers.get("content-disposition").map(String::as_str),
            Some("inline; filename=\"r\u{e9}sum\u{e9}.pdf\"")
        );
    }

    #[test]
    fn test_unknown_method_rejected() {
        let event = GatewayEvent {
            http_method: "DELETE".into(),
            path: "/x".into(),
            ..GatewayEvent::default()
        };
        assert!(matches!(
            event.into_inbound(),
            Err(ProxyError::MethodNotAllowed(m)) if m == Method::DELETE
        ));
    }

    #[test]
    fn test_malformed_method_rejected() {
        let event = GatewayEvent {
            path: "/x".into(),
            ..GatewayEvent::default()
        };
        assert!(matches!(event.into_inbound(), Err(ProxyError::InvalidMethod(_))));
    }

    #[test]
    fn test_multi_value_headers() {
        let mut response = OutboundResponse::new(StatusCode::OK)
            .with_header("content-type", "text/html")
            .with_body("hi");
        response.headers.append("set-cookie", "a=1");
        response.headers.append("set-cookie", "b=2");

        let gateway = GatewayResponse::from(response);
        assert_eq!(gateway.status_code, 200);
        assert_eq!(gateway.headers.get("content-type").map(String::as_str), Some("text/html"));
        assert_eq!(
            gateway.multi_value_headers.get("set-cookie"),
            Some(&vec!["a=1".to_string(), "b=2".to_string()])
        );
        assert!(gateway.is_base64_encoded);
        assert_eq!(gateway.body, "aGk=");
    }

    #[tokio::test]
    async fn test_handle_event_asset() {
        let upstream = Arc::new(RecordingUpstream::new().reply(
            StatusCode::OK,
            &[("content-type", "application/javascript"), ("content-length", "2")],
            b"a;",
        ));
        let event = GatewayEvent {
            http_method: "GET".into(),
            path: "/app-77.js".into(),
            query_string_parameters: Some(BTreeMap::from([("v".to_string(), "2".to_string())])),
            ..GatewayEvent::default()
        };

        let response = handle_event(&proxy(&upstream), event).await;

        assert_eq!(response.status_code, 200);
        assert!(!response.headers.contains_key("content-length"));
        let body = STANDARD.decode(&response.body).unwrap();
        assert_eq!(body, format!("a;{LOGIN_REDIRECT_SCRIPT}").into_bytes());
        assert_eq!(
            upstream.requests()[0].url.as_str(),
            "https://vibeus.notion.site/app-77.js?v=2"
        );
    }

    #[tokio::test]
    async fn test_handle_event_redirect_serializes() {
        let upstream = Arc::new(RecordingUpstream::new());
        let event = GatewayEvent {
            http_method: "GET".into(),
            path: "/".into(),
            ..GatewayEvent::default()
        };

        let response = handle_event(&proxy(&upstream), event).await;
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["statusCode"], 302);
        assert_eq!(
            json["headers"]["location"],
            "https://vibe.pub/ede524fe18db48c4b6565b37968d7203"
        );
        assert_eq!(json["body"], "");
        assert!(json.get("multiValueHeaders").is_none());
    }
}
