// Application state module
// Immutable configuration plus the few process-wide runtime values

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use super::types::Config;

/// Application state shared by every connection
pub struct AppState {
    pub config: Config,
    /// Connections currently being served
    pub active_connections: Arc<AtomicUsize>,
    /// Cancelled once when the server should stop
    pub shutdown: CancellationToken,
    /// Notified when `active_connections` drops to zero
    pub drained: Arc<Notify>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            active_connections: Arc::new(AtomicUsize::new(0)),
            shutdown: CancellationToken::new(),
            drained: Arc::new(Notify::new()),
        }
    }

    /// Give back a connection slot taken in `accept_connection`
    pub fn release_connection(&self) {
        if self.active_connections.fetch_sub(1, Ordering::SeqCst) == 1 {
            // notify_one keeps a permit when nobody is draining yet
            self.drained.notify_one();
        }
    }
}
