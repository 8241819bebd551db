//! Integration tests for the authority HTTP surface
//!
//! Drives the router in-process with `oneshot` and checks the snapshot
//! sequence seen by a poller after each command.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use stacklight::core::create_router;
use tower::ServiceExt;

async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn post(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

async fn broadcast(app: &Router) -> Value {
    let (status, body) = get(app, "/api/broadcast").await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_ping() {
    let app = create_router();
    let (status, body) = get(&app, "/api/ping").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, json!({"ok": true}));
}

#[tokio::test]
async fn test_initial_snapshot_is_clear() {
    let app = create_router();
    assert_eq!(
        broadcast(&app).await,
        json!({"show_light_state": null, "sk_light_state": null})
    );
}

#[tokio::test]
async fn test_card_scores_clear_sequence() {
    let app = create_router();

    let (status, ack) = post(&app, "/api/scorekeeper/potential_card").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack, json!({"ok": true}));
    assert_eq!(
        broadcast(&app).await,
        json!({
            "show_light_state": null,
            "sk_light_state": {"origin": "scorekeeper", "kind": "potential_card"}
        })
    );

    post(&app, "/api/scorekeeper/scores_ready").await;
    assert_eq!(
        broadcast(&app).await,
        json!({
            "show_light_state": null,
            "sk_light_state": {"origin": "scorekeeper", "kind": "scores_ready"}
        })
    );

    post(&app, "/api/scorekeeper/clear").await;
    assert_eq!(
        broadcast(&app).await,
        json!({"show_light_state": null, "sk_light_state": null})
    );
}

#[tokio::test]
async fn test_go_then_halt_keeps_scorekeeping() {
    let app = create_router();
    post(&app, "/api/scorekeeper/scores_ready").await;
    let before = broadcast(&app).await["sk_light_state"].clone();

    post(&app, "/api/scorekeeper/show_go").await;
    assert_eq!(
        broadcast(&app).await["show_light_state"],
        json!({"origin": "show", "kind": "show_clear"})
    );

    post(&app, "/api/scorekeeper/show_halt").await;
    let snap = broadcast(&app).await;
    assert_eq!(snap["show_light_state"], json!({"origin": "show", "kind": "halt"}));
    assert_eq!(snap["sk_light_state"], before);
}

#[tokio::test]
async fn test_halt_twice_is_idempotent() {
    let app = create_router();
    post(&app, "/api/scorekeeper/show_halt").await;
    let once = broadcast(&app).await;
    post(&app, "/api/scorekeeper/show_halt").await;
    assert_eq!(broadcast(&app).await, once);
}

#[tokio::test]
async fn test_clear_zeroes_both_channels() {
    let app = create_router();
    post(&app, "/api/scorekeeper/show_go").await;
    post(&app, "/api/scorekeeper/potential_card").await;
    post(&app, "/api/scorekeeper/clear").await;
    assert_eq!(
        broadcast(&app).await,
        json!({"show_light_state": null, "sk_light_state": null})
    );
}

#[tokio::test]
async fn test_director_and_boh_are_placeholders() {
    let app = create_router();
    post(&app, "/api/scorekeeper/show_halt").await;
    let before = broadcast(&app).await;

    for uri in ["/api/director", "/api/boh"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty(), "{} should have no body", uri);
    }
    assert_eq!(broadcast(&app).await, before);
}

#[tokio::test]
async fn test_commands_require_post() {
    let app = create_router();
    let (status, _) = get(&app, "/api/scorekeeper/clear").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_unknown_route() {
    let app = create_router();
    let (status, _) = get(&app, "/api/scorekeeper/stretch").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
