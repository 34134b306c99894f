//! Shared application state for the server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::broadcast;

use crate::viewer::{Viewer, ViewerEvent};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Timeline, playback and layout for the connected store
    pub viewer: Viewer,
    /// When the daemon started
    pub start_time: Instant,
    /// Open WebSocket connections
    pub ws_connections: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(viewer: Viewer) -> Self {
        Self {
            viewer,
            start_time: Instant::now(),
            ws_connections: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Subscribe to viewer events.
    pub fn subscribe(&self) -> broadcast::Receiver<ViewerEvent> {
        self.viewer.subscribe()
    }

    pub fn uptime_seconds(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    pub fn ws_connection_count(&self) -> usize {
        self.ws_connections.load(Ordering::Relaxed)
    }
}
