// Server loop module
// Accepts connections until shutdown, then drains the ones still open

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Accept connections on `listener` until `state.shutdown` is cancelled.
///
/// Accept errors are logged and the loop keeps going. After the loop exits
/// this waits for the connections already being served to finish, for at
/// most `performance.request_timeout` seconds.
pub async fn run_server(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = state.shutdown.cancelled() => {
                logger::log_info("Shutdown requested, no longer accepting connections");
                break;
            }
        }
    }

    drop(listener);
    drain_connections(&state).await;
    Ok(())
}

/// Wait until every active connection has released its slot
async fn drain_connections(state: &AppState) {
    let active = state.active_connections.load(Ordering::SeqCst);
    if active == 0 {
        return;
    }
    logger::log_info(&format!("Waiting for {active} open connection(s) to finish"));

    let limit = Duration::from_secs(state.config.performance.request_timeout);
    let drained = async {
        // A stale permit only costs one extra check
        while state.active_connections.load(Ordering::SeqCst) > 0 {
            state.drained.notified().await;
        }
    };

    if tokio::time::timeout(limit, drained).await.is_err() {
        logger::log_warning(&format!(
            "{} connection(s) still open after {} seconds, stopping anyway",
            state.active_connections.load(Ordering::SeqCst),
            limit.as_secs()
        ));
    } else {
        logger::log_info("All connections closed");
    }
}
