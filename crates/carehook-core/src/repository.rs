//! Event store abstraction.

use std::num::NonZeroU32;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::event::{AppointmentEvent, StoredEventRecord};

/// Append-only, duplicate-rejecting log of appointment events keyed by
/// `(appointment_id, timestamp)`.
///
/// Implementations must enforce the key's uniqueness in storage so that two
/// concurrent `store` calls for the same pair yield exactly one success and
/// one [`StoreError::DuplicateEvent`].
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Creates the backing structures if absent. Safe to call repeatedly.
    async fn initialize(&self) -> Result<(), StoreError>;

    /// Persists `event`, stamping `received_at`, and returns the new id.
    ///
    /// Fails with [`StoreError::DuplicateEvent`] when the pair is taken.
    async fn store(&self, event: &AppointmentEvent) -> Result<i64, StoreError>;

    /// Whether a record with exactly this pair exists.
    async fn event_exists(&self, appointment_id: &str, timestamp: &str)
    -> Result<bool, StoreError>;

    /// At most `limit` records, most recently received first. Records
    /// received at the same instant are ordered latest insert first.
    async fn list_events(&self, limit: NonZeroU32) -> Result<Vec<StoredEventRecord>, StoreError>;

    /// Releases underlying resources. Safe to call more than once.
    async fn close(&self);
}
