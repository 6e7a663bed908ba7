// Server loop module
// Accepts connections until shutdown is requested, then waits for in-flight ones

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::signal::ShutdownSignal;
use crate::config::AppState;
use crate::logger;

/// Poll interval while draining open connections
const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Run the accept loop. Must run inside a `LocalSet`.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: Arc<ShutdownSignal>,
) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = shutdown.wait() => {
                logger::log_info("Stopped accepting connections");
                break;
            }
        }
    }

    drop(listener);
    drain_connections(&state).await;
}

/// Wait for open connections, bounded by the connection timeout
async fn drain_connections(state: &AppState) {
    let perf = &state.config.performance;
    let limit = Duration::from_secs(perf.read_timeout.max(perf.write_timeout));

    let drained = tokio::time::timeout(limit, async {
        while state.active_connections.load(Ordering::SeqCst) > 0 {
            tokio::time::sleep(DRAIN_POLL).await;
        }
    })
    .await;

    if drained.is_err() {
        logger::log_warning(&format!(
            "Shutdown with {} connection(s) still open",
            state.active_connections.load(Ordering::SeqCst)
        ));
    }
}
