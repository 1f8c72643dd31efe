//! Webhook ingestion endpoint.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing::post};
use serde::Serialize;
use uuid::Uuid;

use carehook_appointments::application::command_handlers;
use carehook_appointments::domain::commands::IngestAppointmentEvent;

use crate::REQUEST_ID_HEADER;
use crate::error::ApiError;
use crate::state::AppState;

/// Response body for an accepted event.
#[derive(Debug, Serialize)]
pub struct AcceptedResponse {
    /// Always `"accepted"`.
    pub status: &'static str,
    /// Human-readable confirmation.
    pub message: &'static str,
    /// Store-assigned event identifier.
    pub event_id: i64,
    /// Appointment the event belongs to.
    pub appointment_id: String,
    /// Identifier of the request.
    pub request_id: Uuid,
}

/// POST /webhook/appointments
///
/// The body is taken raw so that unparsable JSON is reported by the
/// ingestion handler with the service's own error body.
async fn receive_appointment_event(State(state): State<AppState>, body: Bytes) -> Response {
    let command = IngestAppointmentEvent::new(body.to_vec());
    let request_id = command.request_id;

    let outcome = command_handlers::handle_ingest_appointment_event(
        &command,
        &state.validator,
        &*state.event_store,
    )
    .await;

    let (event_id, appointment_id) = match ApiError::check_outcome(outcome, request_id) {
        Ok(accepted) => accepted,
        Err(error) => return error.into_response(),
    };

    let mut response = Json(AcceptedResponse {
        status: "accepted",
        message: "Appointment event received and stored",
        event_id,
        appointment_id,
        request_id,
    })
    .into_response();
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Returns the webhook router.
pub fn router() -> Router<AppState> {
    Router::new().route("/webhook/appointments", post(receive_appointment_event))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use carehook_core::clock::Clock;
    use carehook_core::repository::EventStore;
    use carehook_core::schema::ValidationSchema;
    use carehook_core::validation::Validator;
    use carehook_test_support::{
        FailingEventStore, FixedClock, RacingEventStore, RecordingEventStore, canonical_payload,
    };
    use chrono::Utc;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::EventsLimit;

    fn app_state_with(event_store: Arc<dyn EventStore>) -> AppState {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(Utc::now()));
        let validator = Arc::new(Validator::new(ValidationSchema::default()));
        AppState::new(clock, validator, event_store, EventsLimit::default())
    }

    async fn post_body(state: AppState, body: Vec<u8>) -> (StatusCode, Value, Option<String>) {
        let app = router().with_state(state);
        let request = Request::builder()
            .method("POST")
            .uri("/webhook/appointments")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let header = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .map(|v| v.to_str().unwrap().to_owned());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap(), header)
    }

    #[tokio::test]
    async fn test_valid_payload_returns_200_with_event_id() {
        // Arrange
        let store = Arc::new(RecordingEventStore::new());
        let body = serde_json::to_vec(&canonical_payload()).unwrap();

        // Act
        let (status, json, header) = post_body(app_state_with(store.clone()), body).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "accepted");
        assert_eq!(json["event_id"], 1);
        assert_eq!(json["appointment_id"], "A12345");
        assert_eq!(json["request_id"].as_str(), header.as_deref());
        assert_eq!(store.records().len(), 1);
    }

    #[tokio::test]
    async fn test_unparsable_body_returns_400_invalid_json() {
        // Act
        let (status, json, _) = post_body(
            app_state_with(Arc::new(RecordingEventStore::new())),
            b"{\"event_type\": ".to_vec(),
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid JSON");
        assert_eq!(json["message"], "Request body must be valid JSON");
        assert!(json["request_id"].is_string());
    }

    #[tokio::test]
    async fn test_raced_duplicate_returns_409() {
        // Act
        let (status, json, _) = post_body(
            app_state_with(Arc::new(RacingEventStore)),
            serde_json::to_vec(&canonical_payload()).unwrap(),
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"], "Duplicate event");
    }

    #[tokio::test]
    async fn test_storage_failure_returns_500_without_detail() {
        // Act
        let (status, json, _) = post_body(
            app_state_with(Arc::new(FailingEventStore)),
            serde_json::to_vec(&canonical_payload()).unwrap(),
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Internal server error");
        assert!(!json["message"].as_str().unwrap().contains("connection refused"));
        assert!(json["request_id"].is_string());
    }
}
