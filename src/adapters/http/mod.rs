//! HTTP adapter: webhook intake and health probe.

mod handlers;
mod routes;

pub use handlers::{
    gateway_events, health, AppState, RETRY_HEADER, SIGNATURE_HEADER, TIMESTAMP_HEADER,
};
pub use routes::app_router;
