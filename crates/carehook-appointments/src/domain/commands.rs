//! Commands for the appointments context.

use carehook_core::command::Command;
use uuid::Uuid;

/// Command to ingest one webhook delivery.
#[derive(Debug, Clone)]
pub struct IngestAppointmentEvent {
    /// Identifier assigned to the inbound request.
    pub request_id: Uuid,
    /// Raw request body, not yet parsed.
    pub body: Vec<u8>,
}

impl IngestAppointmentEvent {
    /// Creates the command with a fresh request identifier.
    #[must_use]
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            body: body.into(),
        }
    }
}

impl Command for IngestAppointmentEvent {
    fn command_type(&self) -> &'static str {
        "appointments.ingest_event"
    }

    fn request_id(&self) -> Uuid {
        self.request_id
    }
}
