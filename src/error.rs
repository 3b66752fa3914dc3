//! Crate error type for startup and bootstrap paths
//!
//! Request handling never returns these; they only surface while building
//! state or decoding a proxy event.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid proxy event: {0}")]
    Event(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
