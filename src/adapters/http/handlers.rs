//! HTTP handlers for the webhook and health endpoints.
//!
//! The webhook handler needs the raw, unparsed body bytes: the signature is
//! computed over exactly what the gateway sent, so the body must be verified
//! before any JSON parsing.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use tracing::warn;

use crate::application::{DispatchOutcome, EventDispatcher};
use crate::domain::{SignatureVerifier, WebhookEnvelope};

/// Gateway header carrying the request timestamp.
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
/// Gateway header carrying the request signature.
pub const SIGNATURE_HEADER: &str = "x-slack-signature";
/// Present when the gateway redelivers an event.
pub const RETRY_HEADER: &str = "x-slack-retry-num";

/// Shared state for the webhook routes.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<SignatureVerifier>,
    pub dispatcher: Arc<EventDispatcher>,
}

/// `POST /slack/events` - verified gateway event intake.
///
/// Verification failures reject the request with 401 before any state is
/// touched; everything else is acknowledged immediately while processing
/// continues in the background.
pub async fn gateway_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let timestamp = headers.get(TIMESTAMP_HEADER).and_then(|v| v.to_str().ok());
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());

    if let Err(e) = state.verifier.verify(timestamp, signature, &body) {
        warn!(error = %e, "webhook verification failed");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response();
    }

    let envelope: WebhookEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "unparseable webhook body");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "invalid JSON body" })),
            )
                .into_response();
        }
    };

    let is_retry = headers.contains_key(RETRY_HEADER);
    match state.dispatcher.dispatch(envelope, is_retry) {
        DispatchOutcome::Challenge(challenge) => {
            Json(json!({ "challenge": challenge })).into_response()
        }
        DispatchOutcome::Ack => Json(json!({ "ok": true })).into_response(),
    }
}

/// `GET /health` - unauthenticated liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}
