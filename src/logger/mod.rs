//! Logger module
//!
//! Provides logging utilities for the server including:
//! - Subscriber setup (`tracing` + `EnvFilter`)
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging

mod format;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Target used for access log lines, so they can be filtered separately
pub const ACCESS_TARGET: &str = "access";

/// Initialize the global subscriber
///
/// `RUST_LOG` takes precedence over `logging.level`. Should be called once at
/// startup; a second call is a no-op.
pub fn init(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!(
        %addr,
        backend = ?config.storage.backend,
        bucket = %config.storage.bucket_name(),
        workers = ?config.server.workers,
        max_connections = ?config.performance.max_connections,
        "server listening"
    );
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!(%peer_addr, "connection accepted");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!(error = ?err, "failed to serve connection");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: ACCESS_TARGET, "{}", entry.format(format));
}

pub fn log_shutdown(reason: &str) {
    tracing::info!(reason, "shutting down");
}
