//! Query handlers for the appointments context.

use std::num::NonZeroU32;

use carehook_core::error::StoreError;
use carehook_core::event::StoredEventRecord;
use carehook_core::repository::EventStore;
use serde::Serialize;

/// Read-only view of the most recently received events.
#[derive(Debug, Serialize)]
pub struct EventListView {
    /// Number of events returned.
    pub count: usize,
    /// Events, most recently received first. Empty, never absent, when
    /// nothing is stored.
    pub events: Vec<StoredEventRecord>,
}

/// Lists up to `limit` events, most recently received first.
///
/// # Errors
///
/// Returns `StoreError::Infrastructure` if the store cannot be read.
pub async fn list_recent_events(
    limit: NonZeroU32,
    store: &dyn EventStore,
) -> Result<EventListView, StoreError> {
    let events = store.list_events(limit).await?;
    Ok(EventListView {
        count: events.len(),
        events,
    })
}
