//! Response descriptor module
//!
//! Transport-agnostic description of what to send back: status, headers, body.
//! Every terminal branch of the resolver has a builder here.

use hyper::body::Bytes;
use std::collections::BTreeMap;

use crate::http::cache::CachePolicy;

pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_HEADERS: &str = "Content-Type";
pub const CORS_ALLOW_METHODS: &str = "GET, OPTIONS";
pub const ALLOW: &str = "GET, HEAD, OPTIONS";

/// Response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    /// Object bytes; transports that carry text encode these as base64
    Binary(Bytes),
    /// Plain text error body, never base64-encoded
    Text(String),
    Empty,
}

impl ResponseBody {
    pub fn len(&self) -> usize {
        match self {
            Self::Binary(bytes) => bytes.len(),
            Self::Text(text) => text.len(),
            Self::Empty => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw bytes for byte-oriented transports
    pub fn into_bytes(self) -> Bytes {
        match self {
            Self::Binary(bytes) => bytes,
            Self::Text(text) => Bytes::from(text),
            Self::Empty => Bytes::new(),
        }
    }
}

/// Response descriptor produced for every request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: ResponseBody,
}

impl AssetResponse {
    fn new(status: u16, body: ResponseBody) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_string(), value.into());
        self
    }

    /// Header lookup, case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether the body must travel base64-encoded over text transports
    pub const fn is_base64_encoded(&self) -> bool {
        matches!(self.body, ResponseBody::Binary(_))
    }

    fn with_full_cors(self) -> Self {
        self.with_header("Access-Control-Allow-Origin", CORS_ALLOW_ORIGIN)
            .with_header("Access-Control-Allow-Headers", CORS_ALLOW_HEADERS)
            .with_header("Access-Control-Allow-Methods", CORS_ALLOW_METHODS)
    }

    fn plain_text(status: u16, message: &str) -> Self {
        Self::new(status, ResponseBody::Text(message.to_string()))
            .with_header("Content-Type", "text/plain")
            .with_header("Access-Control-Allow-Origin", CORS_ALLOW_ORIGIN)
    }

    /// 200 with a stored object
    pub fn asset(data: Bytes, content_type: &str, cache: CachePolicy) -> Self {
        Self::new(200, ResponseBody::Binary(data))
            .with_header("Content-Type", content_type)
            .with_header("Cache-Control", cache.to_header_value())
            .with_full_cors()
    }

    /// 200 with the application shell served in place of a missing key
    pub fn app_shell(data: Bytes) -> Self {
        Self::asset(data, "text/html", CachePolicy::NoStore)
    }

    /// 404 when even the application shell is missing
    pub fn not_found() -> Self {
        Self::plain_text(404, "Not Found")
    }

    /// 500 for backend failures; carries no backend detail
    pub fn internal_error() -> Self {
        Self::plain_text(500, "Internal Server Error")
    }

    /// 400 for paths that cannot be turned into a storage key
    pub fn bad_request() -> Self {
        Self::plain_text(400, "Bad Request")
    }

    /// 405 Method Not Allowed
    pub fn method_not_allowed() -> Self {
        Self::plain_text(405, "Method Not Allowed").with_header("Allow", ALLOW)
    }

    /// 204 CORS preflight
    pub fn preflight() -> Self {
        Self::new(204, ResponseBody::Empty)
            .with_full_cors()
            .with_header("Access-Control-Max-Age", "86400")
    }

    /// 200 plain text for health probes
    pub fn health(status: &str) -> Self {
        Self::new(200, ResponseBody::Text(status.to_string()))
            .with_header("Content-Type", "text/plain")
            .with_header("Cache-Control", CachePolicy::NoStore.to_header_value())
    }
}
