//! Axum router construction for the relay.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chatrelay_db::MessageSink;
use tower_http::trace::TraceLayer;

use crate::state::{RelayState, StatsSnapshot};
use crate::ws;

/// Build the relay router.
///
/// - `GET /` -- `WebSocket` upgrade (the address the ingress dials)
/// - `GET /ws` -- same upgrade under an explicit path
/// - `GET /health` -- relay counters as JSON
pub fn build_router<S: MessageSink>(state: Arc<RelayState<S>>) -> Router {
    Router::new()
        .route("/", get(ws::ws_upgrade::<S>))
        .route("/ws", get(ws::ws_upgrade::<S>))
        .route("/health", get(health::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health<S: MessageSink>(State(state): State<Arc<RelayState<S>>>) -> Json<StatsSnapshot> {
    Json(state.stats.snapshot())
}
