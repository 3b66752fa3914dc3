// Application state module
// Everything built once at startup and shared read-only by all requests

use std::sync::Arc;

use super::types::{Config, StorageBackend, StorageConfig};
use crate::resolver::Resolver;
use crate::storage::{FsStore, HttpStore, ObjectStore};

/// Application state
pub struct AppState {
    pub config: Config,
    pub resolver: Resolver,
}

impl AppState {
    /// Build the storage backend and resolver described by `config`
    pub fn new(config: Config) -> Self {
        let store = build_store(&config.storage);
        let resolver = Resolver::new(store, config.storage.bucket_name());
        Self { config, resolver }
    }

    /// Use an already constructed store (tests, embedding)
    pub fn with_store(config: Config, store: Arc<dyn ObjectStore>) -> Self {
        let resolver = Resolver::new(store, config.storage.bucket_name());
        Self { config, resolver }
    }
}

fn build_store(storage: &StorageConfig) -> Arc<dyn ObjectStore> {
    match storage.backend {
        StorageBackend::Fs => Arc::new(FsStore::new(&storage.root)),
        StorageBackend::Http => Arc::new(HttpStore::new(&storage.endpoint)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_backend_selection() {
        let mut cfg = Config::load_from("/nonexistent/spa-origin-config.toml").unwrap();
        cfg.storage.stage = "qa".to_string();
        let state = AppState::new(cfg.clone());
        assert_eq!(state.resolver.store_name(), "fs");
        assert_eq!(state.resolver.bucket(), "qa-ui-web-static-assets");

        cfg.storage.backend = StorageBackend::Http;
        let state = AppState::new(cfg);
        assert_eq!(state.resolver.store_name(), "http");
    }
}
