//! Payload and event fixtures.

use carehook_core::event::AppointmentEvent;
use carehook_core::schema::ValidationSchema;
use carehook_core::validation::Validator;
use serde_json::{Value, json};

/// The canonical scheduled-appointment payload.
#[must_use]
pub fn canonical_payload() -> Value {
    json!({
        "event_type": "appointment.scheduled",
        "appointment_id": "A12345",
        "patient_id": "P8765",
        "timestamp": "2025-01-10T12:30:00Z",
        "notes": "Annual physical"
    })
}

/// A validated `appointment.scheduled` event for the given pair.
///
/// # Panics
///
/// Panics if the arguments do not form a valid event under the default
/// schema.
#[must_use]
pub fn appointment_event(appointment_id: &str, timestamp: &str) -> AppointmentEvent {
    let payload = json!({
        "event_type": "appointment.scheduled",
        "appointment_id": appointment_id,
        "patient_id": "P8765",
        "timestamp": timestamp,
    });
    Validator::new(ValidationSchema::default())
        .validate(&payload)
        .expect("fixture payload must validate")
}
