//! Wall-clock abstraction.
//!
//! `received_at` stamps and the health payload both read time through
//! [`Clock`] so tests can pin it.

use chrono::{DateTime, SecondsFormat, Utc};

/// Source of the current UTC time.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current time as RFC 3339 text with microsecond precision
    /// and a `Z` suffix.
    ///
    /// The width is fixed, so lexicographic order of the text equals
    /// chronological order. The event store relies on this when it sorts
    /// the stored `received_at` column.
    fn now_rfc3339(&self) -> String {
        format_utc(self.now())
    }
}

/// Formats a UTC instant the same way [`Clock::now_rfc3339`] does.
#[must_use]
pub fn format_utc(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Production clock backed by the operating system.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
