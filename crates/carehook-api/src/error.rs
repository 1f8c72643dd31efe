//! Carehook API: error types and outcome-to-HTTP mapping.

use axum::Json;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use carehook_appointments::domain::outcomes::IngestionOutcome;
use carehook_core::error::StoreError;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::REQUEST_ID_HEADER;

const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred while processing the event";

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection or pool error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The event store could not be prepared.
    #[error("event store error: {0}")]
    Store(#[from] StoreError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Short error category.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Identifier of the request, for correlating with server logs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<Uuid>,
}

/// An error response: status code plus [`ErrorBody`].
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status.
    pub status: StatusCode,
    /// Response body.
    pub body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, error: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error,
                message: message.into(),
                request_id: None,
            },
        }
    }

    /// Attaches the request identifier.
    #[must_use]
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.body.request_id = Some(request_id);
        self
    }

    /// Splits an ingestion outcome into the accepted `(event_id,
    /// appointment_id)` or the error response for every other outcome.
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` for any outcome other than `Accepted`.
    pub fn check_outcome(
        outcome: IngestionOutcome,
        request_id: Uuid,
    ) -> Result<(i64, String), Self> {
        let error = match outcome {
            IngestionOutcome::Accepted {
                event_id,
                appointment_id,
            } => return Ok((event_id, appointment_id)),
            IngestionOutcome::MalformedPayload => Self::new(
                StatusCode::BAD_REQUEST,
                "Invalid JSON",
                "Request body must be valid JSON",
            ),
            IngestionOutcome::ValidationFailed(failure) => Self::new(
                StatusCode::BAD_REQUEST,
                "Validation failed",
                failure.to_string(),
            ),
            IngestionOutcome::Conflict {
                appointment_id,
                timestamp,
            } => Self::new(
                StatusCode::CONFLICT,
                "Duplicate event",
                format!("Event for appointment {appointment_id} at {timestamp} already exists"),
            ),
            IngestionOutcome::InternalError { .. } => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                INTERNAL_ERROR_MESSAGE,
            ),
        };
        Err(error.with_request_id(request_id))
    }

    /// A `limit` query value that is not a positive integer.
    #[must_use]
    pub fn invalid_limit(message: String) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Invalid limit", message)
    }

    /// The event list could not be read. The store error stays in the logs.
    #[must_use]
    pub fn list_failed() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to retrieve events",
            "An unexpected error occurred while retrieving events",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = self.body.request_id;
        let mut response = (self.status, Json(self.body)).into_response();
        if let Some(request_id) = request_id {
            if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
                response.headers_mut().insert(REQUEST_ID_HEADER, value);
            }
        }
        response
    }
}
