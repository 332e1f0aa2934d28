//! HTTP API route definitions.

use axum::routing::{any, get};
use axum::Router;
use tower_http::trace::TraceLayer;

use super::handlers::{
    health, list_events, list_markets, list_markets_from_store, ready, render_metrics, wallet,
    AppState,
};

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/metrics", get(render_metrics))
        // Data endpoints answer every method so the rejection names it
        .route("/api/events", any(list_events))
        .route("/api/markets", any(list_markets))
        .route("/api/markets/db", any(list_markets_from_store))
        .route("/api/wallet", get(wallet))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
