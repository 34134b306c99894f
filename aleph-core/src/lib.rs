//! Aleph Core - graph-state timeline builder for RDF knowledge graphs.
//!
//! Turns a batch of triples, recorded with session/interaction provenance,
//! into an ordered sequence of immutable graph states for timeline playback.
//!
//! # Features
//!
//! - **Boundary validation**: SPARQL JSON rows are checked eagerly; bad rows
//!   are skipped and counted, never fatal
//! - **Temporal partitioning**: one accumulated state per interaction, or a
//!   single aggregate state
//! - **Stable identity**: short ids and link keys shared by the differ and the
//!   position arena
//! - **Playback**: LIVE/SCRUBBING controller over the state sequence
//!
//! # Usage
//!
//! ```
//! use aleph_core::{BuilderConfig, Dataset, GraphStateBuilder};
//!
//! let builder = GraphStateBuilder::new(BuilderConfig::default());
//! let outcome = builder.build(&Dataset::default());
//! assert!(outcome.is_empty());
//! ```

pub mod differ;
pub mod error;
pub mod layout;
pub mod playback;
pub mod provenance;
pub mod rows;
pub mod sessions;
pub mod snapshot;
pub mod timeline;
pub mod types;
pub mod uri;

pub use differ::{diff_snapshots, DiffSummary, SnapshotDiff};
pub use error::{PlaybackError, RowError};
pub use layout::{session_centers, NodePosition, PlacedNode, Point, PositionArena};
pub use playback::{PlaybackController, PlaybackMode};
pub use provenance::Provenance;
pub use rows::{
    decode_object, decode_result_rows, decode_session_rows, decode_triples, Decoded, ResultRow, RowDiagnostics,
    SessionRow, SparqlResults, Term,
};
pub use sessions::assemble_sessions;
pub use snapshot::build_snapshot;
pub use timeline::{
    partition_by_time, BuildOutcome, Dataset, EmptyReason, GraphStateBuilder, Timeline,
    TimelineMode, AGGREGATE_INTERACTION_URI,
};
pub use types::{
    BuilderConfig, GraphData, Interaction, Link, Node, Object, Session, ShortId, Snapshot,
    SnapshotMeta, Triple, TypeDisplayMode,
};
pub use uri::shorten_identifier;

/// Get the version of aleph-core.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
