//! HTTP command surface for the authority
//!
//! Endpoints:
//! - GET  /api/ping                        - Liveness probe
//! - GET  /api/broadcast                   - Current snapshot
//! - POST /api/scorekeeper/clear           - Clear both channels
//! - POST /api/scorekeeper/potential_card  - Scorekeeping → potential card
//! - POST /api/scorekeeper/scores_ready    - Scorekeeping → scores ready
//! - POST /api/scorekeeper/show_go         - Show → show clear
//! - POST /api/scorekeeper/show_halt       - Show → halt
//! - GET  /api/director, GET /api/boh      - Placeholders, no transition

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::core::SignalStore;
use crate::types::{Action, Snapshot};
use crate::{PATH_BROADCAST, PATH_PING};

/// App state
pub struct AppState {
    /// Sole owner of the channels; handlers take the write lock for exactly one transition
    pub store: RwLock<SignalStore>,
}

/// Acknowledgement body for pings and commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub const OK: Ack = Ack { ok: true };
}

/// Create the API router around a fresh store
pub fn create_router() -> Router {
    create_router_with_store(SignalStore::new())
}

/// Create the API router around an existing store
pub fn create_router_with_store(store: SignalStore) -> Router {
    let state = Arc::new(AppState {
        store: RwLock::new(store),
    });

    Router::new()
        .route(PATH_PING, get(ping))
        .route(PATH_BROADCAST, get(broadcast))
        .route(Action::Clear.path(), post(clear))
        .route(Action::PotentialCard.path(), post(potential_card))
        .route(Action::ScoresReady.path(), post(scores_ready))
        .route(Action::ShowGo.path(), post(show_go))
        .route(Action::Halt.path(), post(show_halt))
        .route("/api/director", get(placeholder))
        .route("/api/boh", get(placeholder))
        .with_state(state)
}

/// Liveness probe
async fn ping() -> Json<Ack> {
    Json(Ack::OK)
}

/// Current snapshot
async fn broadcast(State(state): State<Arc<AppState>>) -> Json<Snapshot> {
    let store = state.store.read().await;
    Json(store.snapshot())
}

async fn clear(State(state): State<Arc<AppState>>) -> Json<Ack> {
    apply(&state, Action::Clear).await
}

async fn potential_card(State(state): State<Arc<AppState>>) -> Json<Ack> {
    apply(&state, Action::PotentialCard).await
}

async fn scores_ready(State(state): State<Arc<AppState>>) -> Json<Ack> {
    apply(&state, Action::ScoresReady).await
}

async fn show_go(State(state): State<Arc<AppState>>) -> Json<Ack> {
    apply(&state, Action::ShowGo).await
}

async fn show_halt(State(state): State<Arc<AppState>>) -> Json<Ack> {
    apply(&state, Action::Halt).await
}

/// Director / back-of-house endpoints have no command semantics yet
async fn placeholder() -> StatusCode {
    StatusCode::OK
}

/// Apply exactly one transition under the write lock
async fn apply(state: &AppState, action: Action) -> Json<Ack> {
    let mut store = state.store.write().await;
    let snapshot = store.apply(action.transition());
    tracing::info!(
        command = %action,
        show = ?snapshot.show_light_state,
        sk = ?snapshot.sk_light_state,
        transitions = store.transition_count(),
        "command applied"
    );
    Json(Ack::OK)
}

/// Run the API server
pub async fn run_server(addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let router = create_router();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "stacklight authority listening");
    println!("🚦 Stacklight authority running on {}", listener.local_addr()?);
    println!("  GET  /api/ping                       - Liveness probe");
    println!("  GET  /api/broadcast                  - Current snapshot");
    println!("  POST /api/scorekeeper/clear          - Clear both channels");
    println!("  POST /api/scorekeeper/potential_card - Potential card");
    println!("  POST /api/scorekeeper/scores_ready   - Scores ready");
    println!("  POST /api/scorekeeper/show_go        - Show go");
    println!("  POST /api/scorekeeper/show_halt      - Halt");
    axum::serve(listener, router).await?;
    Ok(())
}
