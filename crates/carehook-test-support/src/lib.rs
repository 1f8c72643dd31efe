//! Shared test doubles and fixtures for the appointment webhook receiver.

mod clock;
mod fixtures;
mod repository;

pub use clock::{FixedClock, SequenceClock};
pub use fixtures::{appointment_event, canonical_payload};
pub use repository::{FailingEventStore, RacingEventStore, RecordingEventStore};
