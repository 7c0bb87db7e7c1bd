//! Notion site proxy library.
//!
//! Presents a published Notion site under its own domain: requests are
//! routed, forwarded to the Notion host, and selected bodies are rewritten
//! so the site keeps working under the public domain.

pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod rewrite;
pub mod routing;
pub mod security;

pub use config::schema::ProxyConfig;
pub use error::{ProxyError, StartupError};
pub use gateway::{handle_event, GatewayEvent, GatewayResponse};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use proxy::Proxy;
