//! HTTP protocol layer module
//!
//! Response metadata (content type, cache policy) and hyper response rendering,
//! decoupled from how objects are fetched.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used items
pub use cache::CachePolicy;
pub use response::build_response;
