//! Domain error types.

use std::fmt;

use thiserror::Error;

/// Why a payload was rejected by the validator.
///
/// The `Display` text is the client-visible message returned in 400
/// responses, so it names the offending field(s) explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    /// The payload is valid JSON but not a JSON object.
    #[error("Payload must be a JSON object")]
    MalformedPayload,

    /// One or more required fields are absent, in schema order.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// A required field is present but `null`.
    #[error("Field '{0}' cannot be null")]
    NullField(String),

    /// A field's value does not have the declared type.
    #[error("Field '{field}' must be a {expected}, got {actual}")]
    TypeMismatch {
        /// The offending field.
        field: String,
        /// The type declared by the schema.
        expected: String,
        /// The JSON type actually supplied.
        actual: &'static str,
    },

    /// `event_type` is not in the schema's enumeration.
    #[error("Invalid event_type '{value}'. Must be one of: {}", .allowed.join(", "))]
    InvalidEventType {
        /// The rejected value.
        value: String,
        /// Allowed values, sorted lexicographically.
        allowed: Vec<String>,
    },

    /// `timestamp` is not ISO-8601.
    #[error(
        "Invalid timestamp format. Must be ISO 8601 format (e.g., '2025-01-10T12:30:00Z'). Error: {0}"
    )]
    InvalidTimestamp(String),

    /// An identifier is empty after trimming whitespace.
    #[error("{0} cannot be empty or whitespace")]
    EmptyIdentifier(String),
}

/// Discriminant of [`ValidationFailure`], for matching and logging without
/// the payload-specific details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationFailureKind {
    /// See [`ValidationFailure::MalformedPayload`].
    MalformedPayload,
    /// See [`ValidationFailure::MissingFields`].
    MissingFields,
    /// See [`ValidationFailure::NullField`].
    NullField,
    /// See [`ValidationFailure::TypeMismatch`].
    TypeMismatch,
    /// See [`ValidationFailure::InvalidEventType`].
    InvalidEventType,
    /// See [`ValidationFailure::InvalidTimestamp`].
    InvalidTimestamp,
    /// See [`ValidationFailure::EmptyIdentifier`].
    EmptyIdentifier,
}

impl ValidationFailure {
    /// Returns the failure kind.
    #[must_use]
    pub fn kind(&self) -> ValidationFailureKind {
        match self {
            Self::MalformedPayload => ValidationFailureKind::MalformedPayload,
            Self::MissingFields(_) => ValidationFailureKind::MissingFields,
            Self::NullField(_) => ValidationFailureKind::NullField,
            Self::TypeMismatch { .. } => ValidationFailureKind::TypeMismatch,
            Self::InvalidEventType { .. } => ValidationFailureKind::InvalidEventType,
            Self::InvalidTimestamp(_) => ValidationFailureKind::InvalidTimestamp,
            Self::EmptyIdentifier(_) => ValidationFailureKind::EmptyIdentifier,
        }
    }
}

impl fmt::Display for ValidationFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MalformedPayload => "malformed_payload",
            Self::MissingFields => "missing_fields",
            Self::NullField => "null_field",
            Self::TypeMismatch => "type_mismatch",
            Self::InvalidEventType => "invalid_event_type",
            Self::InvalidTimestamp => "invalid_timestamp",
            Self::EmptyIdentifier => "empty_identifier",
        };
        f.write_str(name)
    }
}

/// Errors raised by an [`EventStore`](crate::repository::EventStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The `(appointment_id, timestamp)` uniqueness constraint rejected the
    /// insert.
    #[error("Event for appointment {appointment_id} at {timestamp} already exists")]
    DuplicateEvent {
        /// Appointment of the rejected event.
        appointment_id: String,
        /// Timestamp of the rejected event, verbatim.
        timestamp: String,
    },

    /// Storage unavailable or failed unexpectedly.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
