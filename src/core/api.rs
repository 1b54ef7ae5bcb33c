//! HTTP + WebSocket API for RPSense
//!
//! Endpoints:
//! - GET /health - Health check
//! - POST /session/new - Create session with a strategy
//! - GET /session/{id} - Current round snapshot
//! - POST /session/{id}/feed - Report capture feed ready or failed
//! - POST /session/{id}/observation - Classified gesture (or none)
//! - POST /session/{id}/sample - Raw finger curls, classified server-side
//! - POST /session/{id}/reset - Play again
//! - POST /session/{id}/strategy - Select or clear the strategy
//! - WS /ws/{id} - Live updates

use axum::{
    extract::{Path, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use crate::core::{spawn_session, CurlEstimator, GameSession, RoundEvent, RoundStateMachine, SessionHandle};
use crate::types::{GameConfig, GameError, GestureObservation, HandSample, Move, RoundOutput, StrategyMode};

/// App state
pub struct AppState {
    pub sessions: RwLock<HashMap<String, SessionHandle>>,
    pub config: GameConfig,
}

/// Create new session request
#[derive(Debug, Deserialize)]
pub struct NewSessionRequest {
    pub strategy: String,
}

/// Create new session response
#[derive(Debug, Serialize)]
pub struct NewSessionResponse {
    pub session_id: String,
    pub websocket_url: String,
    pub strategy: StrategyMode,
}

/// Feed status report
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FeedRequest {
    Ready,
    Failed { reason: String },
}

/// Classified frame. `hand: false` is an empty frame and must not carry a
/// move; a missing move with a hand means the gesture was unclear.
#[derive(Debug, Deserialize)]
pub struct ObservationRequest {
    #[serde(rename = "move")]
    pub mv: Option<Move>,
    #[serde(default = "full_confidence")]
    pub confidence: f64,
    #[serde(default = "hand_present")]
    pub hand: bool,
}

fn full_confidence() -> f64 {
    1.0
}

fn hand_present() -> bool {
    true
}

/// Strategy request; null clears the strategy
#[derive(Debug, Deserialize)]
pub struct StrategyRequest {
    pub strategy: Option<String>,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions_active: usize,
}

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(err: GameError) -> ApiError {
    let status = match &err {
        GameError::FeedUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        GameError::NoStrategySelected | GameError::InvalidTransition { .. } => StatusCode::CONFLICT,
        GameError::UnknownMove(_) | GameError::UnknownStrategy(_) | GameError::InvalidConfig(_) => {
            StatusCode::BAD_REQUEST
        }
        GameError::SessionClosed => StatusCode::GONE,
        GameError::Io(_) | GameError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse { error: err.to_string() }))
}

fn bad_request(error: String) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error }))
}

fn not_found(id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse { error: format!("no session {}", id) }),
    )
}

/// Create the API router
pub fn create_router(config: GameConfig) -> Router {
    let state = Arc::new(AppState {
        sessions: RwLock::new(HashMap::new()),
        config,
    });

    Router::new()
        .route("/health", get(health))
        .route("/session/new", post(create_session))
        .route("/session/:id", get(get_session))
        .route("/session/:id/feed", post(report_feed))
        .route("/session/:id/observation", post(add_observation))
        .route("/session/:id/sample", post(add_sample))
        .route("/session/:id/reset", post(reset_round))
        .route("/session/:id/strategy", post(set_strategy))
        .route("/ws/:id", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let sessions = state.sessions.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        sessions_active: sessions.len(),
    })
}

/// Create new session
async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewSessionRequest>,
) -> Result<Json<NewSessionResponse>, ApiError> {
    let mode: StrategyMode = req.strategy.parse().map_err(api_error)?;
    let machine = RoundStateMachine::new(state.config.clone());
    let classifier = CurlEstimator::new(state.config.min_gesture_score);
    let handle = spawn_session(GameSession::new(machine, Box::new(classifier)));
    handle.send(RoundEvent::SelectStrategy(mode)).await.map_err(api_error)?;

    let session_id = generate_session_id();
    state.sessions.write().await.insert(session_id.clone(), handle);
    info!("session {} created with {} strategy", session_id, mode);

    Ok(Json(NewSessionResponse {
        websocket_url: format!("/ws/{}", session_id),
        session_id,
        strategy: mode,
    }))
}

async fn lookup(state: &AppState, id: &str) -> Result<SessionHandle, ApiError> {
    let sessions = state.sessions.read().await;
    let handle = sessions.get(id).cloned().ok_or_else(|| not_found(id))?;
    if handle.is_closed() {
        return Err(api_error(GameError::SessionClosed));
    }
    Ok(handle)
}

async fn dispatch(state: &AppState, id: &str, event: RoundEvent) -> Result<Json<RoundOutput>, ApiError> {
    let handle = lookup(state, id).await?;
    handle.send(event).await.map(Json).map_err(api_error)
}

/// Get session snapshot
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RoundOutput>, ApiError> {
    let handle = lookup(&state, &id).await?;
    Ok(Json(handle.latest()))
}

/// Report capture feed status
async fn report_feed(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<FeedRequest>,
) -> Result<Json<RoundOutput>, ApiError> {
    let event = match req {
        FeedRequest::Ready => RoundEvent::FeedReady,
        FeedRequest::Failed { reason } => RoundEvent::FeedFailed(reason),
    };
    dispatch(&state, &id, event).await
}

/// Add classified observation
async fn add_observation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ObservationRequest>,
) -> Result<Json<RoundOutput>, ApiError> {
    let event = match (req.hand, req.mv) {
        (true, mv) => RoundEvent::Observation(mv.map(|mv| GestureObservation::new(mv, req.confidence))),
        (false, None) => RoundEvent::EmptyFrame,
        (false, Some(mv)) => return Err(bad_request(format!("move {} sent without a hand", mv))),
    };
    dispatch(&state, &id, event).await
}

/// Add raw hand sample
async fn add_sample(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(sample): Json<HandSample>,
) -> Result<Json<RoundOutput>, ApiError> {
    dispatch(&state, &id, RoundEvent::Sample(sample)).await
}

/// Play again
async fn reset_round(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RoundOutput>, ApiError> {
    dispatch(&state, &id, RoundEvent::ResetRound).await
}

/// Select or clear strategy
async fn set_strategy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<StrategyRequest>,
) -> Result<Json<RoundOutput>, ApiError> {
    let event = match req.strategy {
        Some(name) => RoundEvent::SelectStrategy(name.parse().map_err(api_error)?),
        None => RoundEvent::ChangeStrategy,
    };
    dispatch(&state, &id, event).await
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, ApiError> {
    let handle = lookup(&state, &id).await?;
    let rx = handle.subscribe();

    Ok(ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, rx).await;
    }))
}

/// Forward updates until either side goes away
async fn handle_websocket(socket: WebSocket, mut rx: broadcast::Receiver<RoundOutput>) {
    let (mut sender, mut receiver) = socket.split();
    loop {
        tokio::select! {
            update = rx.recv() => match update {
                Ok(update) => {
                    let json = serde_json::to_string(&update).unwrap_or_default();
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("websocket client lagged, skipped {} updates", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
        }
    }
}

/// Generate session ID
fn generate_session_id() -> String {
    format!("session_{:016x}", rand::random::<u64>())
}

/// Run the API server
pub async fn run_server(addr: &str, config: GameConfig) -> Result<(), Box<dyn std::error::Error>> {
    let router = create_router(config);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("RPSense API running on {}", addr);
    println!("✊ RPSense API running on {}", addr);
    println!("  POST /session/new              - Create session");
    println!("  GET  /session/:id              - Get round snapshot");
    println!("  POST /session/:id/feed         - Report feed ready/failed");
    println!("  POST /session/:id/observation  - Add classified gesture");
    println!("  POST /session/:id/sample       - Add raw finger curls");
    println!("  POST /session/:id/reset        - Play again");
    println!("  POST /session/:id/strategy     - Select/clear strategy");
    println!("  WS   /ws/:id                   - Live updates");
    println!("  GET  /health                   - Health check");
    axum::serve(listener, router).await?;
    Ok(())
}
