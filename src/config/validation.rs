//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, redirect codes, addresses)
//! - Validate that hosts and the root page id are well formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::ProxyConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("site.root_page_id must be 32 lowercase hex characters, got {0:?}")]
    InvalidPageId(String),

    #[error("{field} must be \"http\" or \"https\", got {value:?}")]
    InvalidScheme { field: &'static str, value: String },

    #[error("{field} is not a valid host: {value:?}")]
    InvalidHost { field: &'static str, value: String },

    #[error("site.redirect_status must be 301 or 302, got {0}")]
    InvalidRedirectStatus(u16),

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("timeouts.request_secs ({request}) must not be shorter than timeouts.upstream_secs ({upstream})")]
    RequestShorterThanUpstream { request: u64, upstream: u64 },

    #[error("{field} is not a socket address: {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("security.max_body_size must be greater than zero")]
    ZeroBodyLimit,
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let site = &config.site;

    if !is_page_id(&site.root_page_id) {
        errors.push(ValidationError::InvalidPageId(site.root_page_id.clone()));
    }

    for (field, value) in [
        ("site.public_scheme", &site.public_scheme),
        ("site.upstream_scheme", &site.upstream_scheme),
    ] {
        if value != "http" && value != "https" {
            errors.push(ValidationError::InvalidScheme {
                field,
                value: value.clone(),
            });
        }
    }

    for (field, value) in [
        ("site.public_domain", &site.public_domain),
        ("site.upstream_host", &site.upstream_host),
        ("site.upstream_canonical_host", &site.upstream_canonical_host),
    ] {
        if !is_host(value) {
            errors.push(ValidationError::InvalidHost {
                field,
                value: value.clone(),
            });
        }
    }

    if !matches!(site.redirect_status, 301 | 302) {
        errors.push(ValidationError::InvalidRedirectStatus(site.redirect_status));
    }

    let timeouts = &config.timeouts;
    for (field, value) in [
        ("connect_secs", timeouts.connect_secs),
        ("upstream_secs", timeouts.upstream_secs),
        ("request_secs", timeouts.request_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout(field));
        }
    }
    if timeouts.request_secs < timeouts.upstream_secs {
        errors.push(ValidationError::RequestShorterThanUpstream {
            request: timeouts.request_secs,
            upstream: timeouts.upstream_secs,
        });
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_page_id(id: &str) -> bool {
    id.len() == 32 && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Accepts `host` or `host:port`, nothing else.
fn is_host(value: &str) -> bool {
    if value.is_empty() || value.contains(|c: char| matches!(c, '/' | '?' | '#' | '@')) {
        return false;
    }
    url::Url::parse(&format!("http://{value}/"))
        .map(|url| url.host_str().is_some())
        .unwrap_or(false)
}
