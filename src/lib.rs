//! Single-page application origin
//!
//! Serves a built SPA out of an object store bucket. Paths map to storage keys,
//! response metadata comes from static tables, and paths without a stored
//! object fall back to `index.html` so client-side routing can handle them.
//! Backend failures are never mistaken for missing objects.

pub mod config;
pub mod error;
pub mod gateway;
pub mod handler;
pub mod http;
pub mod logger;
pub mod resolver;
pub mod response;
pub mod server;
pub mod storage;

pub use error::{Error, Result};
pub use resolver::{AssetRequest, Resolver, StorageKey};
pub use response::{AssetResponse, ResponseBody};
