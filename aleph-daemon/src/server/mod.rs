//! HTTP server for the aleph daemon.
//!
//! Provides REST API for:
//! - Status and health checks
//! - Timeline listing, single states and diffs
//! - Playback (seek, live) and builder settings
//! - Layout positions carried across states
//! - Store actions (node details, sample data, reset)

mod http;
pub mod state;
mod websocket;

pub use http::create_router;
pub use state::AppState;
