//! HTTP routes and handlers for the timeline API.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use aleph_core::{
    PlaybackController, PlacedNode, Snapshot, SnapshotDiff, TypeDisplayMode,
};

use super::state::AppState;
use super::websocket::websocket_handler;
use crate::loader::NodeDetails;
use crate::viewer::{PositionUpdate, ReloadStatus, TimelineSummary, ViewerStatus};

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health and status
        .route("/health", get(health))
        .route("/status", get(status))
        // Timeline
        .route("/timeline", get(timeline))
        .route("/states/:index", get(get_state))
        .route("/current", get(current))
        .route("/diff", get(diff))
        .route("/reload", post(reload))
        // Playback
        .route("/seek", post(seek))
        .route("/live", post(live))
        .route("/settings", post(settings))
        // Layout
        .route("/layout", get(layout))
        .route("/positions", post(positions))
        .route("/unpin", post(unpin))
        // Store operations
        .route("/node", get(node))
        .route("/sample", post(sample))
        .route("/reset", post(reset))
        // WebSocket for live updates
        .route("/ws", get(websocket_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

// =============================================================================
// Response Types
// =============================================================================

#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
    duration_ms: u64,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T, duration_ms: u64) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
            duration_ms,
        })
    }

    fn err(error: impl ToString, duration_ms: u64) -> Json<Self> {
        Json(Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            duration_ms,
        })
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

const NO_TIMELINE: &str = "No timeline loaded (store empty or unreachable)";

// =============================================================================
// Health & Status
// =============================================================================

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "aleph-daemon"
    }))
}

#[derive(Serialize)]
struct StatusResponse {
    status: String,
    viewer: ViewerStatus,
    connections: usize,
    uptime_seconds: f64,
}

async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let start = Instant::now();
    let data = StatusResponse {
        status: "running".to_string(),
        viewer: state.viewer.status().await,
        connections: state.ws_connection_count(),
        uptime_seconds: state.uptime_seconds(),
    };
    ApiResponse::ok(data, elapsed_ms(start))
}

// =============================================================================
// Timeline
// =============================================================================

async fn timeline(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let start = Instant::now();
    match state.viewer.summary().await {
        Some(summary) => ApiResponse::ok(summary, elapsed_ms(start)),
        None => ApiResponse::<TimelineSummary>::err(NO_TIMELINE, elapsed_ms(start)),
    }
}

async fn get_state(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> impl IntoResponse {
    let start = Instant::now();
    match state.viewer.state(index).await {
        Some(snapshot) => ApiResponse::ok(snapshot, elapsed_ms(start)),
        None => ApiResponse::<Snapshot>::err(
            format!("State not found: {}", index),
            elapsed_ms(start),
        ),
    }
}

#[derive(Serialize)]
struct CurrentResponse {
    playback: PlaybackController,
    state: Snapshot,
}

async fn current(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let start = Instant::now();
    let playback = state.viewer.playback().await;
    match state.viewer.current_state().await {
        Some(snapshot) => ApiResponse::ok(
            CurrentResponse {
                playback,
                state: snapshot,
            },
            elapsed_ms(start),
        ),
        None => ApiResponse::<CurrentResponse>::err(NO_TIMELINE, elapsed_ms(start)),
    }
}

#[derive(Deserialize)]
struct DiffParams {
    from: Option<usize>,
    to: usize,
}

async fn diff(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DiffParams>,
) -> impl IntoResponse {
    let start = Instant::now();
    match state.viewer.diff(params.from, params.to).await {
        Ok(diff) => ApiResponse::ok(diff, elapsed_ms(start)),
        Err(e) => ApiResponse::<SnapshotDiff>::err(e, elapsed_ms(start)),
    }
}

async fn reload(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let start = Instant::now();
    match state.viewer.reload().await {
        Ok(status) => ApiResponse::ok(status, elapsed_ms(start)),
        Err(e) => ApiResponse::<ReloadStatus>::err(e, elapsed_ms(start)),
    }
}

// =============================================================================
// Playback
// =============================================================================

#[derive(Deserialize)]
struct SeekRequest {
    index: usize,
}

async fn seek(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SeekRequest>,
) -> impl IntoResponse {
    let start = Instant::now();
    match state.viewer.seek(req.index).await {
        Ok(playback) => ApiResponse::ok(playback, elapsed_ms(start)),
        Err(e) => ApiResponse::<PlaybackController>::err(e, elapsed_ms(start)),
    }
}

async fn live(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let start = Instant::now();
    let playback = state.viewer.go_live().await;
    ApiResponse::ok(playback, elapsed_ms(start))
}

#[derive(Deserialize)]
struct SettingsRequest {
    #[serde(default)]
    type_display: Option<TypeDisplayMode>,
    #[serde(default)]
    aggregate: Option<bool>,
}

async fn settings(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SettingsRequest>,
) -> impl IntoResponse {
    let start = Instant::now();
    match state.viewer.set_settings(req.type_display, req.aggregate).await {
        Ok(status) => ApiResponse::ok(status, elapsed_ms(start)),
        Err(e) => ApiResponse::<ReloadStatus>::err(e, elapsed_ms(start)),
    }
}

// =============================================================================
// Layout
// =============================================================================

async fn layout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let start = Instant::now();
    let nodes: Vec<PlacedNode> = state.viewer.placed_nodes().await;
    ApiResponse::ok(nodes, elapsed_ms(start))
}

#[derive(Deserialize)]
struct PositionsRequest {
    positions: Vec<PositionUpdate>,
}

#[derive(Serialize)]
struct PositionsResponse {
    known: usize,
    total: usize,
}

async fn positions(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PositionsRequest>,
) -> impl IntoResponse {
    let start = Instant::now();
    let known = state.viewer.report_positions(&req.positions).await;
    ApiResponse::ok(
        PositionsResponse {
            known,
            total: req.positions.len(),
        },
        elapsed_ms(start),
    )
}

#[derive(Deserialize)]
struct UnpinRequest {
    id: String,
}

async fn unpin(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UnpinRequest>,
) -> impl IntoResponse {
    let start = Instant::now();
    if state.viewer.unpin(&req.id).await {
        ApiResponse::ok(req.id, elapsed_ms(start))
    } else {
        ApiResponse::<String>::err(format!("Node not placed: {}", req.id), elapsed_ms(start))
    }
}

// =============================================================================
// Store operations
// =============================================================================

#[derive(Deserialize)]
struct NodeParams {
    uri: String,
}

async fn node(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NodeParams>,
) -> impl IntoResponse {
    let start = Instant::now();
    match state.viewer.node_details(&params.uri).await {
        Ok(details) => ApiResponse::ok(details, elapsed_ms(start)),
        Err(e) => ApiResponse::<NodeDetails>::err(e, elapsed_ms(start)),
    }
}

async fn sample(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let start = Instant::now();
    match state.viewer.load_sample_data().await {
        Ok(status) => ApiResponse::ok(status, elapsed_ms(start)),
        Err(e) => ApiResponse::<ReloadStatus>::err(e, elapsed_ms(start)),
    }
}

async fn reset(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let start = Instant::now();
    match state.viewer.reset().await {
        Ok(status) => ApiResponse::ok(status, elapsed_ms(start)),
        Err(e) => ApiResponse::<ReloadStatus>::err(e, elapsed_ms(start)),
    }
}
