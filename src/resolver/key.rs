//! Storage key derivation
//!
//! Turns a request path into the key an object is stored under.

use std::fmt;
use thiserror::Error;

/// Key of the application shell, served for `/` and as the SPA fallback
pub const INDEX_KEY: &str = "index.html";

/// Reasons a path cannot become a storage key
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("path traversal segment in '{0}'")]
    Traversal(String),
    #[error("forbidden character in '{0}'")]
    ForbiddenCharacter(String),
}

/// Normalized, non-empty object key without a leading slash
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    /// The application shell key
    pub fn index() -> Self {
        Self(INDEX_KEY.to_string())
    }

    /// Derive a key from a request path
    ///
    /// Empty and `.` segments are dropped and a path without a leading slash is
    /// read as a bare key. A `..` segment, a backslash or a NUL byte rejects the
    /// path. Nothing left after normalization means the root, i.e. `index.html`.
    pub fn from_path(path: &str) -> Result<Self, KeyError> {
        if path.contains(['\\', '\0']) {
            return Err(KeyError::ForbiddenCharacter(path.to_string()));
        }

        let mut segments = Vec::new();
        for segment in path.split('/') {
            match segment {
                "" | "." => {}
                ".." => return Err(KeyError::Traversal(path.to_string())),
                s => segments.push(s),
            }
        }

        if segments.is_empty() {
            return Ok(Self::index());
        }
        Ok(Self(segments.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the application shell
    pub fn is_index(&self) -> bool {
        self.0 == INDEX_KEY
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(path: &str) -> String {
        StorageKey::from_path(path).unwrap().to_string()
    }

    #[test]
    fn test_root_maps_to_index() {
        assert_eq!(key("/"), "index.html");
        assert_eq!(key(""), "index.html");
        assert_eq!(key("//./"), "index.html");
        assert_eq!(StorageKey::from_path("/index.html"), Ok(StorageKey::index()));
    }

    #[test]
    fn test_leading_slash_stripped() {
        assert_eq!(key("/app.js"), "app.js");
        assert_eq!(key("/static/css/main.css"), "static/css/main.css");
    }

    #[test]
    fn test_bare_key_accepted() {
        assert_eq!(key("app.js"), "app.js");
        assert_eq!(key("assets/logo.svg"), "assets/logo.svg");
    }

    #[test]
    fn test_redundant_segments_collapsed() {
        assert_eq!(key("/assets//./logo.svg"), "assets/logo.svg");
        assert_eq!(key("/dashboard/settings/"), "dashboard/settings");
    }

    #[test]
    fn test_traversal_rejected() {
        for path in ["/../secret", "/a/../../b", "..", "/assets/.."] {
            assert!(
                matches!(StorageKey::from_path(path), Err(KeyError::Traversal(_))),
                "{path}"
            );
        }
        // Dots inside a name are fine
        assert_eq!(key("/a..b/c...js"), "a..b/c...js");
    }

    #[test]
    fn test_forbidden_characters_rejected() {
        assert!(matches!(
            StorageKey::from_path("/..\\windows"),
            Err(KeyError::ForbiddenCharacter(_))
        ));
        assert!(matches!(
            StorageKey::from_path("/a\0b"),
            Err(KeyError::ForbiddenCharacter(_))
        ));
    }

    #[test]
    fn test_is_index() {
        assert!(StorageKey::from_path("/").unwrap().is_index());
        assert!(!StorageKey::from_path("/docs/index.html").unwrap().is_index());
    }
}
