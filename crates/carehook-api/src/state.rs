//! Shared application state.

use std::sync::Arc;

use carehook_core::clock::Clock;
use carehook_core::repository::EventStore;
use carehook_core::validation::Validator;

use crate::config::EventsLimit;

/// Application state shared across all request handlers.
///
/// Built once at startup; every collaborator is injected here rather than
/// held in a global.
#[derive(Clone)]
pub struct AppState {
    /// Wall clock for the health payload.
    pub clock: Arc<dyn Clock>,
    /// Payload validator built from the loaded schema.
    pub validator: Arc<Validator>,
    /// Event store.
    pub event_store: Arc<dyn EventStore>,
    /// Bounds for `GET /events`.
    pub events_limit: EventsLimit,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        validator: Arc<Validator>,
        event_store: Arc<dyn EventStore>,
        events_limit: EventsLimit,
    ) -> Self {
        Self {
            clock,
            validator,
            event_store,
            events_limit,
        }
    }
}
