//! HTTP cache control module
//!
//! Chooses the Cache-Control policy for a served storage key.

use super::mime::extension_of;
use crate::resolver::INDEX_KEY;

/// One year, for fingerprinted build assets
pub const IMMUTABLE_MAX_AGE: u32 = 31_536_000;

/// Extensions eligible for long-lived caching
pub const CACHEABLE_EXTENSIONS: &[&str] = &[
    "js", "css", "png", "jpg", "jpeg", "gif", "svg", "ico", "woff", "woff2", "ttf",
];

/// Cache control policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Public cache with specified max-age (seconds)
    Public(u32),
    /// Revalidate on every use
    NoCache,
    /// Never store; used for the application shell
    NoStore,
}

impl CachePolicy {
    /// Convert to Cache-Control header value
    pub fn to_header_value(self) -> String {
        match self {
            Self::Public(max_age) => format!("public, max-age={max_age}"),
            Self::NoCache => "no-cache".to_string(),
            Self::NoStore => "no-cache, no-store, must-revalidate".to_string(),
        }
    }

    /// Select the policy for a storage key
    ///
    /// The application shell is never cached, even though `html` would otherwise
    /// fall through to `no-cache`.
    pub fn for_key(key: &str) -> Self {
        if key == INDEX_KEY {
            return Self::NoStore;
        }
        match extension_of(key) {
            Some(ext) if is_cacheable_extension(&ext) => Self::Public(IMMUTABLE_MAX_AGE),
            _ => Self::NoCache,
        }
    }
}

/// Check whether a lowercase extension is in the cacheable set
pub fn is_cacheable_extension(ext: &str) -> bool {
    CACHEABLE_EXTENSIONS.contains(&ext)
}
