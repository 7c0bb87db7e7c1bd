//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files, and
//! every default matches the production deployment.

use serde::{Deserialize, Serialize};

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Public identity and upstream of the proxied site.
    pub site: SiteConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// The site being presented and the upstream it is served from.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    /// Page shown at `/` (32 lowercase hex characters).
    pub root_page_id: String,

    /// Scheme clients use to reach the proxy.
    pub public_scheme: String,

    /// Domain this proxy presents itself as.
    pub public_domain: String,

    /// Scheme used for upstream calls.
    pub upstream_scheme: String,

    /// Host every request is forwarded to.
    pub upstream_host: String,

    /// Host the upstream embeds in its pages as its own base URL.
    pub upstream_canonical_host: String,

    /// Status code of the root redirect (301 or 302).
    pub redirect_status: u16,

    /// Also point `/{upstream_canonical_host}` references inside the app bundle
    /// at the public domain.
    pub rewrite_asset_hosts: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root_page_id: "ede524fe18db48c4b6565b37968d7203".to_string(),
            public_scheme: "https".to_string(),
            public_domain: "vibe.pub".to_string(),
            upstream_scheme: "https".to_string(),
            upstream_host: "vibeus.notion.site".to_string(),
            upstream_canonical_host: "www.notion.so".to_string(),
            redirect_status: 302,
            rewrite_asset_hosts: false,
        }
    }
}

impl SiteConfig {
    /// Where `/` redirects to.
    pub fn root_redirect_target(&self) -> String {
        format!(
            "{}://{}/{}",
            self.public_scheme, self.public_domain, self.root_page_id
        )
    }

    /// Base URL all upstream paths are resolved against.
    pub fn upstream_base(&self) -> String {
        format!("{}://{}/", self.upstream_scheme, self.upstream_host)
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Total time allowed for one upstream call in seconds.
    pub upstream_secs: u64,

    /// Total time allowed for handling one inbound request in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 30,
            request_secs: 35,
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
