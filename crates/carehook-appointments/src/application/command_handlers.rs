//! Command handlers for the appointments context.
//!
//! Ingestion runs parse → validate → duplicate check → persist, and maps
//! each failure to an [`IngestionOutcome`]. The duplicate check only makes
//! the common retry case cheap; the store's uniqueness constraint still
//! decides races between concurrent deliveries.

use carehook_core::command::Command;
use carehook_core::error::StoreError;
use carehook_core::repository::EventStore;
use carehook_core::validation::Validator;
use serde_json::Value;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::domain::commands::IngestAppointmentEvent;
use crate::domain::outcomes::IngestionOutcome;

/// Handles the `IngestAppointmentEvent` command.
///
/// All log lines emitted while handling the command carry its
/// `request_id`.
pub async fn handle_ingest_appointment_event(
    command: &IngestAppointmentEvent,
    validator: &Validator,
    store: &dyn EventStore,
) -> IngestionOutcome {
    let span = info_span!(
        "ingest_appointment_event",
        request_id = %command.request_id(),
        command = command.command_type(),
    );

    async {
        let outcome = ingest(command, validator, store).await;
        info!(outcome = outcome.label(), "ingestion finished");
        outcome
    }
    .instrument(span)
    .await
}

async fn ingest(
    command: &IngestAppointmentEvent,
    validator: &Validator,
    store: &dyn EventStore,
) -> IngestionOutcome {
    let payload: Value = match serde_json::from_slice(&command.body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "failed to parse JSON body");
            return IngestionOutcome::MalformedPayload;
        }
    };
    debug!(%payload, "received webhook payload");

    let event = match validator.validate(&payload) {
        Ok(event) => event,
        Err(failure) => {
            warn!(kind = %failure.kind(), reason = %failure, "validation failed");
            return IngestionOutcome::ValidationFailed(failure);
        }
    };
    info!(
        appointment_id = event.appointment_id(),
        event_type = event.event_type(),
        "validation succeeded"
    );

    match store
        .event_exists(event.appointment_id(), event.timestamp())
        .await
    {
        Ok(false) => {}
        Ok(true) => {
            warn!(
                appointment_id = event.appointment_id(),
                timestamp = event.timestamp(),
                "duplicate event detected"
            );
            return IngestionOutcome::Conflict {
                appointment_id: event.appointment_id().to_owned(),
                timestamp: event.timestamp().to_owned(),
            };
        }
        Err(e) => {
            error!(error = %e, "duplicate check failed");
            return IngestionOutcome::InternalError {
                detail: e.to_string(),
            };
        }
    }

    match store.store(&event).await {
        Ok(event_id) => {
            info!(event_id, "event stored");
            IngestionOutcome::Accepted {
                event_id,
                appointment_id: event.appointment_id().to_owned(),
            }
        }
        Err(StoreError::DuplicateEvent {
            appointment_id,
            timestamp,
        }) => {
            warn!(%appointment_id, %timestamp, "lost insert race to a concurrent delivery");
            IngestionOutcome::Conflict {
                appointment_id,
                timestamp,
            }
        }
        Err(e @ StoreError::Infrastructure(_)) => {
            error!(error = %e, "failed to store event");
            IngestionOutcome::InternalError {
                detail: e.to_string(),
            }
        }
    }
}
