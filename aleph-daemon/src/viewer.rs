//! Viewer state: the current timeline, playback position and layout arena.
//!
//! A reload takes a ticket from a monotonically increasing counter before it
//! starts. When it completes, it only applies its result if no newer reload
//! has started since; otherwise the result is dropped. State is guarded by a
//! single `RwLock`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use aleph_core::{
    diff_snapshots, BuildOutcome, BuilderConfig, EmptyReason, PlaybackController, PlaybackError,
    PlaybackMode, PlacedNode, PositionArena, Snapshot, SnapshotDiff, Timeline, TimelineMode,
    TypeDisplayMode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::loader::{GraphLoader, LoadError, NodeDetails};

/// Canvas size used to seed cluster centres for new nodes.
pub const DEFAULT_CANVAS: (f64, f64) = (1200.0, 800.0);

const EVENT_CAPACITY: usize = 256;

/// Events broadcast to live clients.
#[derive(Debug, Clone)]
pub enum ViewerEvent {
    /// A reload began.
    ReloadStarted { request: u64 },
    /// A new timeline was applied.
    TimelineUpdated {
        states: usize,
        sessions: usize,
        current: Option<usize>,
    },
    /// The store has no renderable data.
    Empty { reason: EmptyReason },
    /// The reload failed; the previous timeline is still shown.
    LoadFailed { error: String },
    /// The shown state changed.
    IndexChanged {
        index: Option<usize>,
        mode: PlaybackMode,
    },
}

/// What happened to a reload request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReloadStatus {
    Applied { states: usize },
    Empty { reason: EmptyReason },
    /// A newer reload started before this one finished; its result was
    /// discarded.
    Superseded,
}

/// One row of a timeline listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSummary {
    pub index: usize,
    pub session_index: usize,
    pub interaction_index: usize,
    pub session_uri: String,
    pub interaction_uri: String,
    pub timestamp: DateTime<Utc>,
    pub triple_count: usize,
    pub node_count: usize,
    pub link_count: usize,
}

impl StateSummary {
    pub fn new(index: usize, snapshot: &Snapshot) -> Self {
        Self {
            index,
            session_index: snapshot.session_index,
            interaction_index: snapshot.interaction_index,
            session_uri: snapshot.session_uri.clone(),
            interaction_uri: snapshot.interaction_uri.clone(),
            timestamp: snapshot.timestamp,
            triple_count: snapshot.triple_count,
            node_count: snapshot.node_count(),
            link_count: snapshot.link_count(),
        }
    }
}

/// Timeline overview without node/link payloads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineSummary {
    pub mode: TimelineMode,
    pub sessions: usize,
    pub interactions: usize,
    pub unresolved_triples: usize,
    pub skipped_rows: usize,
    pub states: Vec<StateSummary>,
}

impl TimelineSummary {
    pub fn new(timeline: &Timeline) -> Self {
        Self {
            mode: timeline.mode,
            sessions: timeline.session_count(),
            interactions: timeline.interaction_count(),
            unresolved_triples: timeline.unresolved_triples,
            skipped_rows: timeline.diagnostics.skipped,
            states: timeline
                .states
                .iter()
                .enumerate()
                .map(|(i, s)| StateSummary::new(i, s))
                .collect(),
        }
    }
}

/// Viewer status for the `/status` endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ViewerStatus {
    pub endpoint: String,
    pub config: BuilderConfig,
    pub playback: PlaybackController,
    pub states: usize,
    pub empty_reason: Option<EmptyReason>,
    pub last_error: Option<String>,
    pub last_loaded: Option<DateTime<Utc>>,
}

/// A renderer-side position report.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PositionUpdate {
    pub id: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub vx: f64,
    #[serde(default)]
    pub vy: f64,
}

struct ViewerInner {
    timeline: Option<Timeline>,
    playback: PlaybackController,
    config: BuilderConfig,
    arena: PositionArena,
    empty_reason: Option<EmptyReason>,
    last_error: Option<String>,
    last_loaded: Option<DateTime<Utc>>,
    /// State index last handed to the renderer and what it was given.
    rendered: Option<(usize, Vec<PlacedNode>)>,
}

impl ViewerInner {
    fn current(&self) -> Option<&Snapshot> {
        let index = self.playback.index()?;
        self.timeline.as_ref()?.state(index)
    }

    fn len(&self) -> usize {
        self.timeline.as_ref().map(Timeline::len).unwrap_or(0)
    }
}

/// Shared viewer handle. Cheap to clone.
#[derive(Clone)]
pub struct Viewer {
    loader: GraphLoader,
    inner: Arc<RwLock<ViewerInner>>,
    requests: Arc<AtomicU64>,
    events: broadcast::Sender<ViewerEvent>,
}

impl Viewer {
    pub fn new(loader: GraphLoader, config: BuilderConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let inner = ViewerInner {
            timeline: None,
            playback: PlaybackController::default(),
            config,
            arena: PositionArena::new(DEFAULT_CANVAS.0, DEFAULT_CANVAS.1),
            empty_reason: None,
            last_error: None,
            last_loaded: None,
            rendered: None,
        };

        Self {
            loader,
            inner: Arc::new(RwLock::new(inner)),
            requests: Arc::new(AtomicU64::new(0)),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewerEvent> {
        self.events.subscribe()
    }

    fn broadcast(&self, event: ViewerEvent) {
        let _ = self.events.send(event);
    }

    pub fn loader(&self) -> &GraphLoader {
        &self.loader
    }

    /// Fetch fresh data and rebuild the timeline. Last request wins.
    pub async fn reload(&self) -> Result<ReloadStatus, LoadError> {
        let ticket = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
        let config = self.inner.read().await.config;
        self.broadcast(ViewerEvent::ReloadStarted { request: ticket });
        debug!("Reload {} started", ticket);

        let result = self.loader.load(&config).await;

        let mut inner = self.inner.write().await;
        let latest = self.requests.load(Ordering::SeqCst);
        if latest != ticket {
            info!("Discarding reload {} (superseded by {})", ticket, latest);
            return Ok(ReloadStatus::Superseded);
        }

        match result {
            Err(err) => {
                warn!("Reload {} failed: {}", ticket, err);
                inner.last_error = Some(err.to_string());
                self.broadcast(ViewerEvent::LoadFailed {
                    error: err.to_string(),
                });
                Err(err)
            }
            Ok(BuildOutcome::Ready(timeline)) => {
                let states = timeline.len();
                let sessions = timeline.session_count();
                inner.playback.replace(states);
                inner.timeline = Some(timeline);
                inner.rendered = None;
                inner.empty_reason = None;
                inner.last_error = None;
                inner.last_loaded = Some(Utc::now());

                self.broadcast(ViewerEvent::TimelineUpdated {
                    states,
                    sessions,
                    current: inner.playback.index(),
                });
                Ok(ReloadStatus::Applied { states })
            }
            Ok(BuildOutcome::Empty { reason, .. }) => {
                inner.timeline = None;
                inner.playback.replace(0);
                inner.arena.clear();
                inner.rendered = None;
                inner.empty_reason = Some(reason);
                inner.last_error = None;
                inner.last_loaded = Some(Utc::now());

                self.broadcast(ViewerEvent::Empty { reason });
                Ok(ReloadStatus::Empty { reason })
            }
        }
    }

    /// Change builder options and rebuild.
    pub async fn set_settings(
        &self,
        type_display: Option<TypeDisplayMode>,
        aggregate: Option<bool>,
    ) -> Result<ReloadStatus, LoadError> {
        {
            let mut inner = self.inner.write().await;
            if let Some(mode) = type_display {
                inner.config.type_display = mode;
            }
            if let Some(aggregate) = aggregate {
                inner.config.aggregate = aggregate;
            }
            // Identity changes shape between modes; start the layout fresh.
            inner.arena.clear();
            inner.rendered = None;
            info!(
                "Settings changed: types as {}, aggregate {}",
                inner.config.type_display, inner.config.aggregate
            );
        }
        self.reload().await
    }

    pub async fn settings(&self) -> BuilderConfig {
        self.inner.read().await.config
    }

    pub async fn seek(&self, index: usize) -> Result<PlaybackController, PlaybackError> {
        let mut inner = self.inner.write().await;
        if inner.playback.seek(index)? {
            self.broadcast(ViewerEvent::IndexChanged {
                index: inner.playback.index(),
                mode: inner.playback.mode(),
            });
        }
        Ok(inner.playback)
    }

    pub async fn go_live(&self) -> PlaybackController {
        let mut inner = self.inner.write().await;
        let changed = inner.playback.go_live();
        if changed {
            self.broadcast(ViewerEvent::IndexChanged {
                index: inner.playback.index(),
                mode: inner.playback.mode(),
            });
        }
        inner.playback
    }

    pub async fn playback(&self) -> PlaybackController {
        self.inner.read().await.playback
    }

    pub async fn current_state(&self) -> Option<Snapshot> {
        self.inner.read().await.current().cloned()
    }

    pub async fn state(&self, index: usize) -> Option<Snapshot> {
        let inner = self.inner.read().await;
        inner.timeline.as_ref()?.state(index).cloned()
    }

    pub async fn timeline(&self) -> Option<Timeline> {
        self.inner.read().await.timeline.clone()
    }

    pub async fn summary(&self) -> Option<TimelineSummary> {
        let inner = self.inner.read().await;
        inner.timeline.as_ref().map(TimelineSummary::new)
    }

    /// Diff state `to` against state `from`, or against nothing.
    pub async fn diff(&self, from: Option<usize>, to: usize) -> Result<SnapshotDiff, PlaybackError> {
        let inner = self.inner.read().await;
        let len = inner.len();
        let out_of_range = |index| PlaybackError::OutOfRange { index, len };

        let timeline = inner.timeline.as_ref().ok_or(out_of_range(to))?;
        let next = timeline.state(to).ok_or(out_of_range(to))?;
        let previous = match from {
            Some(index) => Some(timeline.state(index).ok_or(out_of_range(index))?),
            None => None,
        };
        Ok(diff_snapshots(previous, next))
    }

    /// Nodes of the shown state with positions carried forward from the
    /// previous render.
    ///
    /// The arena only advances when the shown index changes. Repeated calls
    /// at the same index return the arena's current positions untouched.
    pub async fn placed_nodes(&self) -> Vec<PlacedNode> {
        let mut inner = self.inner.write().await;
        let inner = &mut *inner;
        let (Some(timeline), Some(index)) = (inner.timeline.as_ref(), inner.playback.index())
        else {
            return Vec::new();
        };

        if let Some((shown, placed)) = &inner.rendered {
            if *shown == index {
                return placed
                    .iter()
                    .map(|p| {
                        let mut p = p.clone();
                        if let Some(position) = inner.arena.position(&p.node.id) {
                            p.position = *position;
                        }
                        p
                    })
                    .collect();
            }
        }

        let Some(snapshot) = timeline.state(index) else {
            return Vec::new();
        };
        let placed = inner.arena.carry_forward(
            snapshot,
            &timeline.node_session_index,
            timeline.session_count(),
        );
        inner.rendered = Some((index, placed.clone()));
        placed
    }

    /// Record renderer positions. Returns how many ids were known.
    pub async fn report_positions(&self, updates: &[PositionUpdate]) -> usize {
        let mut inner = self.inner.write().await;
        updates
            .iter()
            .filter(|u| inner.arena.update(&u.id, u.x, u.y, u.vx, u.vy))
            .count()
    }

    pub async fn unpin(&self, id: &str) -> bool {
        self.inner.write().await.arena.unpin(id)
    }

    pub async fn node_details(&self, uri: &str) -> Result<NodeDetails, LoadError> {
        self.loader.node_details(uri).await
    }

    /// Insert the demo data and reload.
    pub async fn load_sample_data(&self) -> Result<ReloadStatus, LoadError> {
        self.loader.load_sample_data().await?;
        self.reload().await
    }

    /// Delete everything in the store and reload.
    pub async fn reset(&self) -> Result<ReloadStatus, LoadError> {
        self.loader.reset().await?;
        self.reload().await
    }

    pub async fn status(&self) -> ViewerStatus {
        let inner = self.inner.read().await;
        ViewerStatus {
            endpoint: self.loader.endpoint().to_string(),
            config: inner.config,
            playback: inner.playback,
            states: inner.len(),
            empty_reason: inner.empty_reason,
            last_error: inner.last_error.clone(),
            last_loaded: inner.last_loaded,
        }
    }
}
