//! WebSocket handler for live timeline updates.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

use super::state::AppState;
use crate::viewer::ViewerEvent;

/// WebSocket upgrade handler.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

pub(crate) fn event_json(event: &ViewerEvent) -> serde_json::Value {
    match event {
        ViewerEvent::ReloadStarted { request } => serde_json::json!({
            "type": "reload_started",
            "request": request
        }),
        ViewerEvent::TimelineUpdated {
            states,
            sessions,
            current,
        } => serde_json::json!({
            "type": "timeline_updated",
            "states": states,
            "sessions": sessions,
            "current": current
        }),
        ViewerEvent::Empty { reason } => serde_json::json!({
            "type": "empty",
            "reason": reason,
            "message": reason.to_string()
        }),
        ViewerEvent::LoadFailed { error } => serde_json::json!({
            "type": "load_failed",
            "error": error
        }),
        ViewerEvent::IndexChanged { index, mode } => serde_json::json!({
            "type": "index_changed",
            "index": index,
            "mode": mode
        }),
    }
}

/// Handle an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let mut event_rx = state.subscribe();
    state.ws_connections.fetch_add(1, Ordering::Relaxed);

    info!("WebSocket client connected");

    // Forward viewer events to the client
    let send_task = tokio::spawn(async move {
        loop {
            let event = match event_rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    debug!("WebSocket client lagged, {} events skipped", skipped);
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            let json = serde_json::to_string(&event_json(&event)).unwrap_or_default();
            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => {
                debug!("Received WebSocket message: {}", text);
            }
            Message::Close(_) => {
                info!("WebSocket client disconnected");
                break;
            }
            _ => {}
        }
    }

    send_task.abort();
    state.ws_connections.fetch_sub(1, Ordering::Relaxed);
}
