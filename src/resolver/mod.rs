//! Asset resolution module
//!
//! Maps a request to a storage key, fetches the object and turns the outcome
//! into an [`AssetResponse`]. Unknown paths resolve to the application shell so
//! client-side routing can take over; backend failures become a bare 500.

mod key;

use hyper::Method;
use std::sync::Arc;

use crate::http::cache::CachePolicy;
use crate::http::mime;
use crate::response::AssetResponse;
use crate::storage::{ObjectStore, StoreError, StoredObject};

pub use key::{KeyError, StorageKey, INDEX_KEY};

/// Inbound request as seen by the resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub method: Method,
    pub path: String,
}

impl AssetRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }
}

/// Outcome of resolving one path, before it is rendered
#[derive(Debug)]
pub enum Resolution {
    /// The requested object exists
    Asset { key: StorageKey, object: StoredObject },
    /// The requested key is missing; the shell is served instead
    Fallback {
        requested: StorageKey,
        shell: StoredObject,
    },
    /// The requested key and the shell are both unavailable
    FallbackMissing {
        requested: StorageKey,
        error: StoreError,
    },
    /// The primary fetch failed for a reason other than a missing key
    BackendFailure { key: StorageKey, error: StoreError },
    /// The path could not be turned into a key
    Rejected(KeyError),
}

impl Resolution {
    pub fn into_response(self) -> AssetResponse {
        match self {
            Self::Asset { key, object } => AssetResponse::asset(
                object.bytes,
                mime::content_type_for_key(key.as_str()),
                CachePolicy::for_key(key.as_str()),
            ),
            Self::Fallback { shell, .. } => AssetResponse::app_shell(shell.bytes),
            Self::FallbackMissing { .. } => AssetResponse::not_found(),
            Self::BackendFailure { .. } => AssetResponse::internal_error(),
            Self::Rejected(_) => AssetResponse::bad_request(),
        }
    }

    fn log(&self, bucket: &str) {
        match self {
            Self::Asset { key, object } => {
                tracing::debug!(
                    bucket,
                    key = %key,
                    bytes = object.bytes.len(),
                    content_type_hint = object.content_type_hint.as_deref(),
                    "asset served"
                );
            }
            Self::Fallback { requested, .. } => {
                tracing::debug!(bucket, key = %requested, "missing key, serving app shell");
            }
            Self::FallbackMissing { requested, error } if error.is_not_found() => {
                tracing::warn!(bucket, key = %requested, "app shell missing from bucket");
            }
            Self::FallbackMissing { requested, error } => {
                tracing::error!(bucket, key = %requested, %error, "app shell fetch failed");
            }
            Self::BackendFailure { key, error } => {
                tracing::error!(bucket, key = %key, %error, "storage backend failure");
            }
            Self::Rejected(error) => {
                tracing::warn!(%error, "rejected request path");
            }
        }
    }
}

/// Resolves requests against one bucket of an object store
///
/// Holds no per-request state, so one instance is shared by all requests.
#[derive(Clone)]
pub struct Resolver {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl Resolver {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    /// Produce the response for a request; never fails
    pub async fn resolve(&self, req: &AssetRequest) -> AssetResponse {
        match req.method {
            Method::GET | Method::HEAD => {}
            Method::OPTIONS => return AssetResponse::preflight(),
            _ => {
                tracing::warn!(method = %req.method, path = %req.path, "method not allowed");
                return AssetResponse::method_not_allowed();
            }
        }

        let resolution = self.classify(&req.path).await;
        resolution.log(&self.bucket);
        resolution.into_response()
    }

    /// Fetch the object for `path`, falling back to the shell on a missing key
    ///
    /// Performs at most two sequential fetches and never retries.
    pub async fn classify(&self, path: &str) -> Resolution {
        let key = match StorageKey::from_path(path) {
            Ok(key) => key,
            Err(e) => return Resolution::Rejected(e),
        };

        match self.store.get(&self.bucket, &key).await {
            Ok(object) => Resolution::Asset { key, object },
            // The shell itself is missing, no point asking again
            Err(error) if error.is_not_found() && key.is_index() => Resolution::FallbackMissing {
                requested: key,
                error,
            },
            Err(error) if error.is_not_found() => {
                match self.store.get(&self.bucket, &StorageKey::index()).await {
                    Ok(shell) => Resolution::Fallback {
                        requested: key,
                        shell,
                    },
                    Err(error) => Resolution::FallbackMissing {
                        requested: key,
                        error,
                    },
                }
            }
            Err(error) => Resolution::BackendFailure { key, error },
        }
    }
}
