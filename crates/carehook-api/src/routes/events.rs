//! Stored event listing endpoint.

use axum::extract::{Query, State};
use axum::{Json, Router, routing::get};
use serde::Deserialize;
use tracing::{error, instrument};

use carehook_appointments::application::query_handlers::{self, EventListView};

use crate::error::ApiError;
use crate::state::AppState;

/// Query string for GET /events.
#[derive(Debug, Deserialize)]
pub struct ListEventsQuery {
    /// Maximum number of events; parsed by the handler so that bad values
    /// get the service's own error body.
    pub limit: Option<String>,
}

/// GET /events
#[instrument(skip(state))]
async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<EventListView>, ApiError> {
    let limit = state
        .events_limit
        .resolve(query.limit.as_deref())
        .map_err(ApiError::invalid_limit)?;

    let view = query_handlers::list_recent_events(limit, &*state.event_store)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to retrieve events");
            ApiError::list_failed()
        })?;

    Ok(Json(view))
}

/// Returns the event listing router.
pub fn router() -> Router<AppState> {
    Router::new().route("/events", get(list_events))
}
