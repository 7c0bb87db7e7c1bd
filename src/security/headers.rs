//! Header set abstraction and sanitization rules.
//!
//! # Responsibilities
//! - Hold request/response headers with case-insensitive names
//! - Strip infrastructure and proxy headers before contacting upstream
//! - Strip length, encoding and CSP headers before answering the client
//!
//! # Design Decisions
//! - Names are lowercased on insertion, so two entries never differ only by case
//! - Repeated names are kept in order (`set-cookie` must survive)
//! - Values are never dropped for non-ASCII bytes; they round-trip as ISO-8859-1
//! - Rule sets are constants; there is no runtime configuration of exclusions

use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// Headers owned by a single transport hop, never forwarded in either direction.
pub const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Returns true if `name` is a hop-by-hop header.
pub fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP_HEADERS
        .iter()
        .any(|h| name.eq_ignore_ascii_case(h))
}

/// Ordered header collection with case-insensitive names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<(String, String)>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value`, replacing every existing value for that name.
    ///
    /// The entry keeps the position of the first value it replaces.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        match self.entries.iter().position(|(n, _)| *n == name) {
            Some(first) => {
                self.entries[first].1 = value;
                let mut index = 0;
                self.entries.retain(|(n, _)| {
                    let keep = index <= first || *n != name;
                    index += 1;
                    keep
                });
            }
            None => self.entries.push((name, value)),
        }
    }

    /// Add another value for `name`, keeping existing ones.
    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        self.entries.push((name.to_ascii_lowercase(), value.into()));
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs. Names are lowercase.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, &str) -> bool) {
        self.entries.retain(|(n, v)| keep(n, v));
    }

    /// Convert into an `http` header map, skipping entries that are not valid header syntax.
    pub fn to_header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_bytes(&encode_value(value)),
            ) {
                (Ok(name), Ok(value)) => {
                    map.append(name, value);
                }
                _ => tracing::debug!(header = %name, "Dropping header with invalid syntax"),
            }
        }
        map
    }
}

impl From<&HeaderMap> for HeaderSet {
    fn from(map: &HeaderMap) -> Self {
        map.iter()
            .map(|(name, value)| (name.as_str(), decode_value(value.as_bytes())))
            .collect()
    }
}

/// Header values are octets. Reading them as ISO-8859-1 keeps obs-text
/// (bytes 0x80-0xFF) intact.
fn decode_value(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

/// Inverse of [`decode_value`]. Text outside ISO-8859-1 goes out as UTF-8.
fn encode_value(value: &str) -> Vec<u8> {
    if value.chars().all(|c| u32::from(c) <= 0xff) {
        value.chars().map(|c| u32::from(c) as u8).collect()
    } else {
        value.as_bytes().to_vec()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for HeaderSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = HeaderSet::new();
        for (name, value) in iter {
            set.append(name.as_ref(), value);
        }
        set
    }
}

/// A fixed exclusion predicate over header names.
#[derive(Debug, Clone, Copy)]
pub struct HeaderRuleSet {
    name: &'static str,
    excluded_prefixes: &'static [&'static str],
    excluded_names: &'static [&'static str],
}

impl HeaderRuleSet {
    /// Client → upstream. Infrastructure metadata and proxy traces are removed
    /// so the upstream sees a direct request.
    pub const INBOUND: HeaderRuleSet = HeaderRuleSet {
        name: "inbound",
        excluded_prefixes: &["cloudfront", "x-"],
        excluded_names: &["host", "via", "referer", "accept-encoding"],
    };

    /// Upstream → client. The body is rewritten and re-framed, and pages are
    /// served from another origin than their CSP was written for.
    pub const OUTBOUND: HeaderRuleSet = HeaderRuleSet {
        name: "outbound",
        excluded_prefixes: &[],
        excluded_names: &[
            "content-encoding",
            "content-length",
            "content-security-policy",
            "x-content-security-policy",
        ],
    };

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns true if a header called `name` must be dropped.
    pub fn excludes(&self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        self.excluded_prefixes.iter().any(|p| name.starts_with(p))
            || self.excluded_names.iter().any(|n| name == *n)
    }

    /// Copy of `headers` without the excluded entries.
    pub fn apply(&self, headers: &HeaderSet) -> HeaderSet {
        headers
            .iter()
            .filter(|(name, _)| !self.excludes(name))
            .collect()
    }
}

/// Clean a client header set before it is sent upstream.
pub fn sanitize_request_headers(headers: &HeaderSet) -> HeaderSet {
    HeaderRuleSet::INBOUND.apply(headers)
}

/// Clean an upstream header set before it is returned to the client.
pub fn sanitize_response_headers(headers: &HeaderSet) -> HeaderSet {
    HeaderRuleSet::OUTBOUND.apply(headers)
}
