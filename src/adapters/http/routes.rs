//! Axum router for the webhook service.

use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{gateway_events, health, AppState};

/// Builds the application router.
///
/// # Routes
///
/// - `POST /slack/events` - signature-verified gateway events
/// - `GET /health` - liveness probe, no auth
pub fn app_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/slack/events", post(gateway_events))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}
