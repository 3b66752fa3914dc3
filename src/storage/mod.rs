//! Object storage module
//!
//! Read-only access to the bucket holding the built application. Backends
//! report a missing key as [`StoreError::NotFound`] so callers can tell it
//! apart from every other failure without looking at messages.

pub mod fs;
pub mod http;
pub mod memory;

use async_trait::async_trait;
use hyper::body::Bytes;
use thiserror::Error;

use crate::resolver::StorageKey;

pub use fs::FsStore;
pub use http::HttpStore;
pub use memory::MemoryStore;

/// Object read from a bucket, owned by the caller for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Bytes,
    /// Content type recorded by the backend, if any
    pub content_type_hint: Option<String>,
}

impl StoredObject {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type_hint: None,
        }
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type_hint = Some(content_type.into());
        self
    }
}

/// Errors returned by object storage backends
#[derive(Debug, Error)]
pub enum StoreError {
    /// The key does not exist in the bucket
    #[error("no such key: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// The backend refused access to the key
    #[error("access denied: {bucket}/{key}")]
    Denied { bucket: String, key: String },

    /// The backend could not be reached
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with something unexpected
    #[error("unexpected storage response: {0}")]
    Protocol(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn not_found(bucket: &str, key: &StorageKey) -> Self {
        Self::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    }

    pub fn denied(bucket: &str, key: &StorageKey) -> Self {
        Self::Denied {
            bucket: bucket.to_string(),
            key: key.to_string(),
        }
    }

    /// True only for a missing key; every other error is a backend failure
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Read path of an object storage backend
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the object stored under `key` in `bucket`
    async fn get(&self, bucket: &str, key: &StorageKey) -> Result<StoredObject, StoreError>;

    /// Short backend name for logs
    fn name(&self) -> &'static str;
}
