//! Integration tests for the HTTP API
//!
//! Tests endpoints, status codes and a full round over HTTP

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use rpsense::core::create_router;
use rpsense::types::GameConfig;
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;

fn create_test_router() -> Router {
    create_router(GameConfig {
        tick_interval_ms: 10,
        seed: Some(8),
        ..GameConfig::default()
    })
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn new_session(app: &Router, strategy: &str) -> String {
    let (status, json) = call(app, "POST", "/session/new", Some(json!({ "strategy": strategy }))).await;
    assert_eq!(status, StatusCode::OK);
    json["session_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_router();
    let (status, json) = call(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["sessions_active"], 0);
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_create_session() {
    let app = create_test_router();
    let (status, json) = call(&app, "POST", "/session/new", Some(json!({ "strategy": "markov" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["strategy"], "markov");
    let id = json["session_id"].as_str().unwrap();
    assert_eq!(json["websocket_url"], format!("/ws/{}", id));

    let (status, snapshot) = call(&app, "GET", &format!("/session/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["phase"], "IDLE");
    assert_eq!(snapshot["mode"], "markov");
}

#[tokio::test]
async fn test_unknown_strategy_is_bad_request() {
    let app = create_test_router();
    let (status, json) = call(&app, "POST", "/session/new", Some(json!({ "strategy": "psychic" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("psychic"));
}

#[tokio::test]
async fn test_session_not_found() {
    let app = create_test_router();
    let (status, _) = call(&app, "GET", "/session/nonexistent", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reset_before_feed_is_conflict() {
    let app = create_test_router();
    let id = new_session(&app, "random").await;
    let (status, _) = call(&app, "POST", &format!("/session/{}/reset", id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_feed_failure_latches() {
    let app = create_test_router();
    let id = new_session(&app, "random").await;
    let feed = format!("/session/{}/feed", id);

    let (status, json) = call(&app, "POST", &feed, Some(json!({ "status": "failed", "reason": "camera denied" }))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(json["error"].as_str().unwrap().contains("camera denied"));

    let (status, _) = call(&app, "POST", &feed, Some(json!({ "status": "ready" }))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_full_round_over_http() {
    let app = create_test_router();
    let id = new_session(&app, "anticipate").await;

    let (status, json) = call(&app, "POST", &format!("/session/{}/feed", id), Some(json!({ "status": "ready" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["phase"], "SAMPLING");

    let (status, json) = call(
        &app,
        "POST",
        &format!("/session/{}/observation", id),
        Some(json!({ "move": "rock", "confidence": 0.85 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["phase"], "COUNTING_DOWN");
    assert_eq!(json["reason"], "R004_COUNTDOWN_STARTED");

    let mut snapshot = Value::Null;
    for _ in 0..100 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        let (_, json) = call(&app, "GET", &format!("/session/{}", id), None).await;
        if json["phase"] == "RESOLVED" {
            snapshot = json;
            break;
        }
    }
    assert_eq!(snapshot["player_move"], "rock");
    assert_eq!(snapshot["computer_move"], "paper");
    assert_eq!(snapshot["outcome"], "COMPUTER_WIN");
    assert_eq!(snapshot["scores"]["computer"], 1);

    let (status, json) = call(&app, "POST", &format!("/session/{}/reset", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["phase"], "SAMPLING");
    assert_eq!(json["scores"]["computer"], 1);
    assert_eq!(json["outcome"], Value::Null);
}

#[tokio::test]
async fn test_sample_endpoint_classifies() {
    let app = create_test_router();
    let id = new_session(&app, "random").await;
    call(&app, "POST", &format!("/session/{}/feed", id), Some(json!({ "status": "ready" }))).await;

    let sample = json!({ "curls": ["no_curl", "no_curl", "no_curl", "no_curl", "no_curl"] });
    let (status, json) = call(&app, "POST", &format!("/session/{}/sample", id), Some(sample)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["latest"]["move"], "paper");
    assert_eq!(json["latest"]["confidence"], 1.0);
}

#[tokio::test]
async fn test_empty_frame_keeps_sampling() {
    let app = create_test_router();
    let id = new_session(&app, "random").await;
    call(&app, "POST", &format!("/session/{}/feed", id), Some(json!({ "status": "ready" }))).await;

    let (status, json) = call(
        &app,
        "POST",
        &format!("/session/{}/observation", id),
        Some(json!({ "move": null, "hand": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["phase"], "SAMPLING");
    assert_eq!(json["reason"], "R003_NO_HAND");
}

#[tokio::test]
async fn test_clearing_strategy_returns_to_idle() {
    let app = create_test_router();
    let id = new_session(&app, "conditional").await;
    let strategy = format!("/session/{}/strategy", id);

    let (status, json) = call(&app, "POST", &strategy, Some(json!({ "strategy": null }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["phase"], "IDLE");
    assert_eq!(json["mode"], Value::Null);

    let (status, _) = call(&app, "POST", &format!("/session/{}/feed", id), Some(json!({ "status": "ready" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, json) = call(&app, "POST", &strategy, Some(json!({ "strategy": "markov" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["mode"], "markov");
}

#[tokio::test]
async fn test_move_without_hand_is_bad_request() {
    let app = create_test_router();
    let id = new_session(&app, "random").await;
    call(&app, "POST", &format!("/session/{}/feed", id), Some(json!({ "status": "ready" }))).await;

    let (status, json) = call(
        &app,
        "POST",
        &format!("/session/{}/observation", id),
        Some(json!({ "move": "rock", "hand": false })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("without a hand"));

    let (_, snapshot) = call(&app, "GET", &format!("/session/{}", id), None).await;
    assert_eq!(snapshot["phase"], "SAMPLING");
}

#[tokio::test]
async fn test_feed_failure_shows_in_snapshot() {
    let app = create_test_router();
    let id = new_session(&app, "markov").await;
    call(&app, "POST", &format!("/session/{}/feed", id), Some(json!({ "status": "failed", "reason": "no camera" }))).await;

    let (status, snapshot) = call(&app, "GET", &format!("/session/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["reason"], "R001_FEED_UNAVAILABLE");
    assert_eq!(snapshot["phase"], "IDLE");
}
