//! Terminal outcomes of an ingestion request.

use carehook_core::error::ValidationFailure;

/// How an ingestion request ended. Every request ends in exactly one of
/// these; nothing is persisted unless the outcome is `Accepted`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestionOutcome {
    /// The event was validated and stored.
    Accepted {
        /// Store-assigned identifier.
        event_id: i64,
        /// Appointment the event belongs to.
        appointment_id: String,
    },

    /// The body is not valid JSON.
    MalformedPayload,

    /// The payload violates the schema.
    ValidationFailed(ValidationFailure),

    /// An event with the same `(appointment_id, timestamp)` is already
    /// stored, whether seen by the pre-check or by the storage constraint.
    Conflict {
        /// Appointment of the rejected event.
        appointment_id: String,
        /// Timestamp of the rejected event, verbatim.
        timestamp: String,
    },

    /// Anything unanticipated. `detail` is for server logs only.
    InternalError {
        /// Underlying error text.
        detail: String,
    },
}

impl IngestionOutcome {
    /// Whether the event was stored.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// Short label for logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Accepted { .. } => "accepted",
            Self::MalformedPayload => "malformed_payload",
            Self::ValidationFailed(_) => "validation_failed",
            Self::Conflict { .. } => "conflict",
            Self::InternalError { .. } => "internal_error",
        }
    }
}
