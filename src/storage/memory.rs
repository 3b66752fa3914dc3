//! In-process object store
//!
//! Holds objects in a map keyed by bucket and key. Used by tests and by
//! embedders that already have the assets in memory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::{ObjectStore, StoreError, StoredObject};
use crate::resolver::StorageKey;

#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: HashMap<(String, String), StoredObject>,
    unavailable: AtomicBool,
    gets: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object; keys are given without a leading slash
    #[must_use]
    pub fn with_object(mut self, bucket: &str, key: &str, object: StoredObject) -> Self {
        self.insert(bucket, key, object);
        self
    }

    pub fn insert(&mut self, bucket: &str, key: &str, object: StoredObject) {
        self.objects
            .insert((bucket.to_string(), key.to_string()), object);
    }

    /// Make every subsequent `get` fail as if the backend were unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `get` calls served so far
    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, bucket: &str, key: &StorageKey) -> Result<StoredObject, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".to_string()));
        }
        self.objects
            .get(&(bucket.to_string(), key.as_str().to_string()))
            .cloned()
            .ok_or_else(|| StoreError::not_found(bucket, key))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_existing_and_missing() {
        let store = MemoryStore::new().with_object("b", "app.js", StoredObject::new("x"));
        let hit = store
            .get("b", &StorageKey::from_path("/app.js").unwrap())
            .await
            .unwrap();
        assert_eq!(hit.bytes.as_ref(), b"x");

        let miss = store
            .get("other", &StorageKey::from_path("/app.js").unwrap())
            .await
            .unwrap_err();
        assert!(miss.is_not_found());
        assert_eq!(store.get_count(), 2);
    }

    #[tokio::test]
    async fn test_unavailable() {
        let store = MemoryStore::new().with_object("b", "index.html", StoredObject::new("<html>"));
        store.set_unavailable(true);
        let err = store.get("b", &StorageKey::index()).await.unwrap_err();
        assert!(!err.is_not_found());
        store.set_unavailable(false);
        assert!(store.get("b", &StorageKey::index()).await.is_ok());
    }
}
