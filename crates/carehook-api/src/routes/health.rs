//! Health check endpoint.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::state::AppState;

/// Service name reported by the health check.
pub const SERVICE_NAME: &str = "Healthcare Appointment Webhook";

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service name.
    pub service: &'static str,
    /// Service status.
    pub status: &'static str,
    /// Current server time (RFC 3339, UTC).
    pub timestamp: String,
    /// Service version.
    pub version: &'static str,
}

/// GET /
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        service: SERVICE_NAME,
        status: "running",
        timestamp: state.clock.now_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Returns the health check router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}
