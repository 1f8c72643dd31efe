//! Carehook API: HTTP surface of the appointment webhook receiver.

use axum::Router;

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

/// Header carrying the per-request identifier on every webhook response.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Builds the application router with all routes mounted.
pub fn app(state: state::AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::webhook::router())
        .merge(routes::events::router())
        .with_state(state)
}
