//! Event store database schema.
//!
//! Statements are idempotent and run one at a time by
//! [`SqliteEventStore::initialize`](crate::SqliteEventStore).

/// SQL to create the appointment events table.
pub const CREATE_EVENTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS appointment_events (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    event_type      TEXT NOT NULL,
    appointment_id  TEXT NOT NULL,
    patient_id      TEXT NOT NULL,
    timestamp       TEXT NOT NULL,
    notes           TEXT,
    received_at     TEXT NOT NULL,
    UNIQUE (appointment_id, timestamp)
)
";

/// SQL to create the `(appointment_id, timestamp)` lookup index.
pub const CREATE_APPOINTMENT_TIMESTAMP_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_appointment_timestamp
    ON appointment_events (appointment_id, timestamp)
";

/// All schema statements, in execution order.
pub const STATEMENTS: [&str; 2] = [CREATE_EVENTS_TABLE, CREATE_APPOINTMENT_TIMESTAMP_INDEX];
