//! HTTP API integration tests against an in-memory store.

mod common;

use aleph_core::BuilderConfig;
use aleph_daemon::server::{create_router, AppState};
use aleph_daemon::{GraphLoader, Viewer};
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use common::{demo_data, FakeStore};
use serde_json::Value;
use tower::ServiceExt;

async fn router() -> Router {
    let store = FakeStore::new(demo_data());
    let viewer = Viewer::new(GraphLoader::new(store), BuilderConfig::default());
    viewer.reload().await.unwrap();
    create_router(AppState::new(viewer))
}

async fn call(router: &Router, method: Method, uri: &str, body: Option<Value>) -> Value {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => request
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let router = router().await;
    let body = call(&router, Method::GET, "/health", None).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_timeline_listing() {
    let router = router().await;
    let body = call(&router, Method::GET, "/timeline", None).await;

    assert_eq!(body["success"], true);
    let states = body["data"]["states"].as_array().unwrap();
    assert_eq!(states.len(), 4);
    assert_eq!(states[3]["triple_count"], 6);
    assert_eq!(body["data"]["mode"], "partitioned");
}

#[tokio::test]
async fn test_state_by_index() {
    let router = router().await;

    let body = call(&router, Method::GET, "/states/0", None).await;
    assert_eq!(body["data"]["nodes"][0]["id"], "GraphDB");
    assert_eq!(body["data"]["nodes"][0]["types"][0], "Technology");

    let body = call(&router, Method::GET, "/states/99", None).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("99"));
}

#[tokio::test]
async fn test_seek_then_current() {
    let router = router().await;

    let body = call(
        &router,
        Method::POST,
        "/seek",
        Some(serde_json::json!({ "index": 1 })),
    )
    .await;
    assert_eq!(body["data"]["mode"], "scrubbing");

    let body = call(&router, Method::GET, "/current", None).await;
    assert_eq!(body["data"]["state"]["triple_count"], 4);

    let body = call(&router, Method::POST, "/live", None).await;
    assert_eq!(body["data"]["mode"], "live");
    assert_eq!(body["data"]["index"], 3);
}

#[tokio::test]
async fn test_diff_endpoint() {
    let router = router().await;
    let body = call(&router, Method::GET, "/diff?from=2&to=3", None).await;
    assert_eq!(body["data"]["new_node_ids"], serde_json::json!(["React"]));
    assert_eq!(body["data"]["removed_node_ids"], serde_json::json!([]));
}

#[tokio::test]
async fn test_settings_endpoint() {
    let router = router().await;
    let body = call(
        &router,
        Method::POST,
        "/settings",
        Some(serde_json::json!({ "aggregate": true })),
    )
    .await;
    assert_eq!(body["data"]["status"], "applied");
    assert_eq!(body["data"]["states"], 1);
}

#[tokio::test]
async fn test_node_rejects_bad_uri() {
    let router = router().await;
    let body = call(&router, Method::GET, "/node?uri=a%3Eb", None).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_layout_endpoint() {
    let router = router().await;
    let body = call(&router, Method::GET, "/layout", None).await;
    let nodes = body["data"].as_array().unwrap();
    assert_eq!(nodes.len(), 4);
    assert!(nodes.iter().all(|n| n["is_new"] == true));
}
