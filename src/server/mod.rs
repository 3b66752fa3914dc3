// Server module entry point
// Listener setup, connection handling and graceful shutdown

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module is exposed as server_loop
#[path = "loop.rs"]
pub mod server_loop;

use std::future::Future;
use std::sync::Arc;

use crate::config::AppState;
use crate::logger;

pub use listener::create_reusable_listener;
pub use server_loop::start_server_loop;
pub use signal::shutdown_signal;

/// Bind the configured address and serve until `shutdown` completes
pub async fn run<S>(state: Arc<AppState>, shutdown: S) -> Result<(), Box<dyn std::error::Error>>
where
    S: Future<Output = &'static str>,
{
    let addr = state.config.get_socket_addr()?;
    let listener = create_reusable_listener(addr)?;
    logger::log_server_start(&listener.local_addr()?, &state.config);
    start_server_loop(listener, state, shutdown).await?;
    Ok(())
}
