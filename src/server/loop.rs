// Server loop module
// Accepts connections until shutdown, then drains in-flight connections

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// How long in-flight connections get to finish after shutdown starts
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);
const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Accept connections until `shutdown` completes.
///
/// The listener is closed as soon as shutdown starts; connections already
/// being served are given [`DRAIN_TIMEOUT`] to complete.
pub async fn start_server_loop<S>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: S,
) -> std::io::Result<()>
where
    S: Future<Output = &'static str>,
{
    let active_connections = Arc::new(AtomicUsize::new(0));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            reason = &mut shutdown => {
                logger::log_shutdown(reason);
                break;
            }
        }
    }

    drop(listener);
    drain_connections(&active_connections).await;
    Ok(())
}

async fn drain_connections(active_connections: &AtomicUsize) {
    let deadline = tokio::time::Instant::now() + DRAIN_TIMEOUT;
    while active_connections.load(Ordering::SeqCst) > 0 {
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Shutdown with {} connection(s) still open",
                active_connections.load(Ordering::SeqCst)
            ));
            return;
        }
        tokio::time::sleep(DRAIN_POLL).await;
    }
}
