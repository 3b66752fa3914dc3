//! Serverless proxy-event adapter
//!
//! Translates proxy events into resolver requests and resolver responses back
//! into proxy responses. Application state is built lazily on the first event
//! and reused by every later one in the same process.

mod event;

use std::sync::{Arc, OnceLock};
use tokio::sync::OnceCell;

use crate::config::{AppState, Config};
use crate::error::{Error, Result};
use crate::resolver::AssetRequest;
use crate::response::AssetResponse;

pub use event::{ProxyEvent, ProxyResponse};

/// Event handler owning the once-only application bootstrap
pub struct Gateway {
    config_path: String,
    state: OnceCell<Arc<AppState>>,
}

impl Gateway {
    /// Handler that loads its configuration from `config_path` on first use
    pub fn new(config_path: impl Into<String>) -> Self {
        Self {
            config_path: config_path.into(),
            state: OnceCell::new(),
        }
    }

    /// Handler around already-built state
    pub fn with_state(state: Arc<AppState>) -> Self {
        Self {
            config_path: String::new(),
            state: OnceCell::new_with(Some(state)),
        }
    }

    /// Process-wide handler; the first caller's config path wins
    pub fn global(config_path: &str) -> &'static Self {
        static GLOBAL: OnceLock<Gateway> = OnceLock::new();
        GLOBAL.get_or_init(|| Self::new(config_path))
    }

    pub fn is_initialized(&self) -> bool {
        self.state.initialized()
    }

    /// Application state, built on first call
    ///
    /// Concurrent first calls build it once. A failed build is not cached, so
    /// the next call tries again.
    pub async fn state(&self) -> Result<&Arc<AppState>> {
        self.state
            .get_or_try_init(|| async {
                let config = Config::load_from(&self.config_path)?;
                tracing::info!(
                    bucket = %config.storage.bucket_name(),
                    backend = ?config.storage.backend,
                    "gateway bootstrapped"
                );
                Ok::<_, Error>(Arc::new(AppState::new(config)))
            })
            .await
    }

    /// Handle one proxy event; always produces a response
    pub async fn handle(&self, event: &ProxyEvent) -> ProxyResponse {
        let state = match self.state().await {
            Ok(state) => state,
            Err(e) => {
                tracing::error!(error = %e, "gateway bootstrap failed");
                return AssetResponse::internal_error().into();
            }
        };

        let Some(method) = event.method() else {
            tracing::warn!(method = ?event.http_method, "invalid method in proxy event");
            return AssetResponse::method_not_allowed().into();
        };

        state
            .resolver
            .resolve(&AssetRequest::new(method, event.path()))
            .await
            .into()
    }

    /// Decode a JSON event, handle it and encode the JSON response
    pub async fn handle_json(&self, input: &str) -> Result<String> {
        let event: ProxyEvent = serde_json::from_str(input)?;
        let response = self.handle(&event).await;
        Ok(serde_json::to_string(&response)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StoredObject};
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    fn gateway(store: MemoryStore) -> Gateway {
        let mut cfg = Config::load_from("/nonexistent/spa-origin-config.toml").unwrap();
        cfg.storage.bucket = Some("site".to_string());
        Gateway::with_state(Arc::new(AppState::with_store(cfg, Arc::new(store))))
    }

    fn event(path: &str) -> ProxyEvent {
        ProxyEvent {
            path: Some(path.to_string()),
            ..ProxyEvent::default()
        }
    }

    #[tokio::test]
    async fn test_asset_event() {
        let gw = gateway(MemoryStore::new().with_object(
            "site",
            "app.js",
            StoredObject::new("console.log('hi')"),
        ));
        let resp = gw.handle(&event("/app.js")).await;
        assert_eq!(resp.status_code, 200);
        assert!(resp.is_base64_encoded);
        assert_eq!(resp.headers["Content-Type"], "application/javascript");
        assert_eq!(resp.headers["Cache-Control"], "public, max-age=31536000");
        assert_eq!(STANDARD.decode(&resp.body).unwrap(), b"console.log('hi')");
    }

    #[tokio::test]
    async fn test_spa_fallback_event() {
        let gw = gateway(
            MemoryStore::new().with_object("site", "index.html", StoredObject::new("<html>")),
        );
        let resp = gw.handle(&event("/dashboard/settings")).await;
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.headers["Content-Type"], "text/html");
        assert_eq!(
            resp.headers["Cache-Control"],
            "no-cache, no-store, must-revalidate"
        );
        assert_eq!(STANDARD.decode(&resp.body).unwrap(), b"<html>");
    }

    #[tokio::test]
    async fn test_unreachable_storage_event() {
        let store = MemoryStore::new().with_object("site", "index.html", StoredObject::new("x"));
        store.set_unavailable(true);
        let resp = gateway(store).handle(&event("/missing.png")).await;
        assert_eq!(resp.status_code, 500);
        assert_eq!(resp.body, "Internal Server Error");
        assert!(!resp.is_base64_encoded);
    }

    #[tokio::test]
    async fn test_invalid_method_event() {
        let gw = gateway(MemoryStore::new());
        let resp = gw
            .handle(&ProxyEvent {
                http_method: Some("B@D".to_string()),
                ..ProxyEvent::default()
            })
            .await;
        assert_eq!(resp.status_code, 405);
    }

    #[tokio::test]
    async fn test_handle_json() {
        let gw = gateway(MemoryStore::new());
        let out = gw
            .handle_json(r#"{"path":"/nothing","httpMethod":"GET"}"#)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["statusCode"], 404);
        assert_eq!(value["body"], "Not Found");

        assert!(gw.handle_json("not json").await.is_err());
    }

    #[tokio::test]
    async fn test_failed_bootstrap_is_not_cached() {
        let path = std::env::temp_dir().join(format!(
            "spa-origin-{}-bad-gateway.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[server]\nport = \"not a port\"\n").unwrap();

        let gw = Gateway::new(path.to_string_lossy());
        let resp = gw.handle(&event("/")).await;
        assert_eq!(resp.status_code, 500);
        assert!(!gw.is_initialized());

        // Fixing the file lets the next event bootstrap
        std::fs::write(&path, "[server]\nport = 8081\n").unwrap();
        assert!(gw.state().await.is_ok());
        assert!(gw.is_initialized());
        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_bootstrap_runs_once() {
        let gw = gateway(MemoryStore::new());
        let first = Arc::as_ptr(gw.state().await.unwrap());
        let second = Arc::as_ptr(gw.state().await.unwrap());
        assert_eq!(first, second);
    }
}
