// Configuration module entry point
// Loads layered configuration and builds the shared application state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, HealthConfig, LoggingConfig, PerformanceConfig, ServerConfig, StorageBackend,
    StorageConfig, BUCKET_SUFFIX,
};

/// Default config file (extension optional)
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

impl Config {
    /// Load configuration from the given file path
    ///
    /// The file is optional. `SPA_`-prefixed environment variables override it,
    /// using `__` between sections (`SPA_STORAGE__STAGE=prod`). A plain `STAGE`
    /// variable seeds the default stage.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let default_stage = std::env::var("STAGE").unwrap_or_else(|_| "dev".to_string());

        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SPA")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("storage.backend", "fs")?
            .set_default("storage.stage", default_stage)?
            .set_default("storage.root", "./public")?
            .set_default("storage.endpoint", "http://127.0.0.1:9000")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        // The runtime builder panics on a zero worker count
        if cfg.server.workers == Some(0) {
            return Err(config::ConfigError::Message(
                "server.workers must be at least 1".to_string(),
            ));
        }
        Ok(cfg)
    }

    /// Load from [`DEFAULT_CONFIG_PATH`]
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
