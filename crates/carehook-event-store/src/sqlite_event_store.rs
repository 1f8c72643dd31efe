//! `SQLite` implementation of the `EventStore` trait.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::{debug, error, info, warn};

use carehook_core::clock::Clock;
use carehook_core::error::StoreError;
use carehook_core::event::{AppointmentEvent, StoredEventRecord};
use carehook_core::repository::EventStore;

use crate::schema;

/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed event store.
///
/// The `(appointment_id, timestamp)` unique constraint is the only guard
/// against duplicates; concurrent writers are serialized by `SQLite` and
/// the loser receives [`StoreError::DuplicateEvent`].
#[derive(Clone)]
pub struct SqliteEventStore {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for SqliteEventStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteEventStore")
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: i64,
    event_type: String,
    appointment_id: String,
    patient_id: String,
    timestamp: String,
    notes: Option<String>,
    received_at: String,
}

impl From<EventRow> for StoredEventRecord {
    fn from(row: EventRow) -> Self {
        Self {
            id: row.id,
            event_type: row.event_type,
            appointment_id: row.appointment_id,
            patient_id: row.patient_id,
            timestamp: row.timestamp,
            notes: row.notes,
            received_at: row.received_at,
        }
    }
}

fn infrastructure(err: &sqlx::Error) -> StoreError {
    StoreError::Infrastructure(err.to_string())
}

impl SqliteEventStore {
    /// Creates a new `SqliteEventStore` over an existing pool.
    #[must_use]
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    /// Opens (creating if missing) the database at `url`.
    ///
    /// File databases use WAL journaling. An in-memory database lives only
    /// as long as its connection, so it is limited to a single connection
    /// that is never recycled.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the URL is invalid or the database cannot be
    /// opened.
    pub async fn connect(
        url: &str,
        max_connections: u32,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, sqlx::Error> {
        let in_memory = url.contains(":memory:");
        let mut options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .busy_timeout(BUSY_TIMEOUT);
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };
        let pool = pool_options.connect_with(options).await?;

        Ok(Self::new(pool, clock))
    }

    /// The underlying pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl EventStore for SqliteEventStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        for statement in schema::STATEMENTS {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| infrastructure(&e))?;
        }
        info!("event store initialized");
        Ok(())
    }

    async fn store(&self, event: &AppointmentEvent) -> Result<i64, StoreError> {
        let received_at = self.clock.now_rfc3339();

        let result = sqlx::query(
            r"INSERT INTO appointment_events
                (event_type, appointment_id, patient_id, timestamp, notes, received_at)
              VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(event.event_type())
        .bind(event.appointment_id())
        .bind(event.patient_id())
        .bind(event.timestamp())
        .bind(event.notes())
        .bind(&received_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => {
                let id = done.last_insert_rowid();
                info!(event_id = id, appointment_id = event.appointment_id(), "stored event");
                Ok(id)
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                warn!(
                    appointment_id = event.appointment_id(),
                    timestamp = event.timestamp(),
                    "uniqueness constraint rejected event"
                );
                Err(StoreError::DuplicateEvent {
                    appointment_id: event.appointment_id().to_owned(),
                    timestamp: event.timestamp().to_owned(),
                })
            }
            Err(e) => {
                error!(error = %e, "failed to store event");
                Err(infrastructure(&e))
            }
        }
    }

    async fn event_exists(
        &self,
        appointment_id: &str,
        timestamp: &str,
    ) -> Result<bool, StoreError> {
        let count: i64 = sqlx::query_scalar(
            r"SELECT COUNT(*)
              FROM appointment_events
              WHERE appointment_id = ? AND timestamp = ?",
        )
        .bind(appointment_id)
        .bind(timestamp)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| infrastructure(&e))?;

        debug!(appointment_id, timestamp, count, "checked event existence");
        Ok(count > 0)
    }

    async fn list_events(&self, limit: NonZeroU32) -> Result<Vec<StoredEventRecord>, StoreError> {
        let rows: Vec<EventRow> = sqlx::query_as(
            r"SELECT id, event_type, appointment_id, patient_id, timestamp, notes, received_at
              FROM appointment_events
              ORDER BY received_at DESC, id DESC
              LIMIT ?",
        )
        .bind(i64::from(limit.get()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| infrastructure(&e))?;

        Ok(rows.into_iter().map(StoredEventRecord::from).collect())
    }

    async fn close(&self) {
        if !self.pool.is_closed() {
            self.pool.close().await;
            info!("event store closed");
        }
    }
}
