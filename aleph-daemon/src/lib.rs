//! Aleph Daemon Library - store access and live viewer state.
//!
//! This library provides:
//! - SPARQL protocol client behind the `QueryEngine` trait
//! - Graph loader turning store contents into a timeline
//! - Viewer state with last-request-wins reloads
//! - HTTP/WebSocket API over the viewer

pub mod loader;
pub mod server;
pub mod sparql;
pub mod viewer;

pub use loader::{GraphLoader, LoadError, NodeDetails, NodeProperty};
pub use sparql::{QueryEngine, SparqlClient, SparqlError};
pub use viewer::{ReloadStatus, StateSummary, TimelineSummary, Viewer, ViewerEvent};
