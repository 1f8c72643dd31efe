//! Appointment event records.

use serde::{Deserialize, Serialize};

/// A validated appointment lifecycle event.
///
/// Only [`Validator::validate`](crate::validation::Validator::validate) can
/// build one, so holding an `AppointmentEvent` proves the payload passed the
/// active schema. Fields are read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppointmentEvent {
    event_type: String,
    appointment_id: String,
    patient_id: String,
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
}

impl AppointmentEvent {
    pub(crate) fn new(
        event_type: String,
        appointment_id: String,
        patient_id: String,
        timestamp: String,
        notes: Option<String>,
    ) -> Self {
        Self {
            event_type,
            appointment_id,
            patient_id,
            timestamp,
            notes,
        }
    }

    /// Lifecycle event type, e.g. `appointment.scheduled`.
    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Appointment identifier, as supplied.
    #[must_use]
    pub fn appointment_id(&self) -> &str {
        &self.appointment_id
    }

    /// Patient identifier, as supplied.
    #[must_use]
    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    /// When the event occurred, verbatim ISO-8601 text.
    #[must_use]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Free-text notes, if the payload carried them.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

/// Persisted representation of an appointment event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEventRecord {
    /// Store-assigned, monotonically increasing identifier.
    pub id: i64,
    /// Lifecycle event type.
    pub event_type: String,
    /// Appointment identifier.
    pub appointment_id: String,
    /// Patient identifier.
    pub patient_id: String,
    /// When the event occurred, verbatim.
    pub timestamp: String,
    /// Free-text notes. Serialized as `null` when absent.
    pub notes: Option<String>,
    /// When the store persisted the event (RFC 3339, UTC).
    pub received_at: String,
}
