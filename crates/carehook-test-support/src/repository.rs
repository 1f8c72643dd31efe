//! Test event stores: mock `EventStore` implementations for tests.

use std::num::NonZeroU32;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use carehook_core::clock::format_utc;
use carehook_core::error::StoreError;
use carehook_core::event::{AppointmentEvent, StoredEventRecord};
use carehook_core::repository::EventStore;
use chrono::{DateTime, Duration, TimeZone, Utc};

fn received_at_base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

/// An in-memory event store that enforces the `(appointment_id, timestamp)`
/// uniqueness rule and records how it was called.
///
/// Each stored record's `received_at` is one second after the previous one,
/// starting at 2026-01-15T10:00:01Z.
#[derive(Debug, Default)]
pub struct RecordingEventStore {
    records: Mutex<Vec<StoredEventRecord>>,
    exists_calls: AtomicUsize,
    store_calls: AtomicUsize,
}

impl RecordingEventStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all stored records in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn records(&self) -> Vec<StoredEventRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Number of `event_exists` calls so far.
    pub fn exists_calls(&self) -> usize {
        self.exists_calls.load(Ordering::SeqCst)
    }

    /// Number of `store` calls so far, successful or not.
    pub fn store_calls(&self) -> usize {
        self.store_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventStore for RecordingEventStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn store(&self, event: &AppointmentEvent) -> Result<i64, StoreError> {
        self.store_calls.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.lock().unwrap();

        let duplicate = records.iter().any(|r| {
            r.appointment_id == event.appointment_id() && r.timestamp == event.timestamp()
        });
        if duplicate {
            return Err(StoreError::DuplicateEvent {
                appointment_id: event.appointment_id().to_owned(),
                timestamp: event.timestamp().to_owned(),
            });
        }

        let id = i64::try_from(records.len()).unwrap() + 1;
        records.push(StoredEventRecord {
            id,
            event_type: event.event_type().to_owned(),
            appointment_id: event.appointment_id().to_owned(),
            patient_id: event.patient_id().to_owned(),
            timestamp: event.timestamp().to_owned(),
            notes: event.notes().map(str::to_owned),
            received_at: format_utc(received_at_base() + Duration::seconds(id)),
        });
        Ok(id)
    }

    async fn event_exists(
        &self,
        appointment_id: &str,
        timestamp: &str,
    ) -> Result<bool, StoreError> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.appointment_id == appointment_id && r.timestamp == timestamp))
    }

    async fn list_events(&self, limit: NonZeroU32) -> Result<Vec<StoredEventRecord>, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .rev()
            .take(limit.get() as usize)
            .cloned()
            .collect())
    }

    async fn close(&self) {}
}

/// An event store whose existence check never sees a duplicate but whose
/// insert always loses to a concurrent writer. Exercises the path where the
/// storage constraint, not the pre-check, catches the duplicate.
#[derive(Debug)]
pub struct RacingEventStore;

#[async_trait]
impl EventStore for RacingEventStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn store(&self, event: &AppointmentEvent) -> Result<i64, StoreError> {
        Err(StoreError::DuplicateEvent {
            appointment_id: event.appointment_id().to_owned(),
            timestamp: event.timestamp().to_owned(),
        })
    }

    async fn event_exists(
        &self,
        _appointment_id: &str,
        _timestamp: &str,
    ) -> Result<bool, StoreError> {
        Ok(false)
    }

    async fn list_events(&self, _limit: NonZeroU32) -> Result<Vec<StoredEventRecord>, StoreError> {
        Ok(Vec::new())
    }

    async fn close(&self) {}
}

/// An event store that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingEventStore;

#[async_trait]
impl EventStore for FailingEventStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        Err(StoreError::Infrastructure("connection refused".into()))
    }

    async fn store(&self, _event: &AppointmentEvent) -> Result<i64, StoreError> {
        Err(StoreError::Infrastructure("connection refused".into()))
    }

    async fn event_exists(
        &self,
        _appointment_id: &str,
        _timestamp: &str,
    ) -> Result<bool, StoreError> {
        Err(StoreError::Infrastructure("connection refused".into()))
    }

    async fn list_events(&self, _limit: NonZeroU32) -> Result<Vec<StoredEventRecord>, StoreError> {
        Err(StoreError::Infrastructure("connection refused".into()))
    }

    async fn close(&self) {}
}
