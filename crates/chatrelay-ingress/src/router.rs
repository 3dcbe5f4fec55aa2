//! Axum router construction for the ingress server.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::IngressState;

/// Build the ingress router.
///
/// At most `max_concurrent_requests` requests are in flight across all
/// routes; with `1`, each request (relay hand-off included) finishes
/// before the next one starts. `0` is treated as `1`.
///
/// `/message` only accepts submissions; a `GET` there gets the `404` page
/// like any other unknown page.
pub fn build_router(state: Arc<IngressState>, max_concurrent_requests: usize) -> Router {
    Router::new()
        .route("/", get(handlers::index).post(handlers::submit))
        .route("/message", get(handlers::not_found).post(handlers::submit))
        .route("/message.html", get(handlers::message_page))
        .route("/static/{*path}", get(handlers::static_asset))
        .fallback(handlers::not_found)
        .layer(GlobalConcurrencyLimitLayer::new(max_concurrent_requests.max(1)))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
