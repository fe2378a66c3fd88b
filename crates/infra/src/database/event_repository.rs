//! SQLite-backed implementation of the `EventStore` port.
//!
//! Every call checks a connection out of the shared pool on the blocking
//! thread pool. Updates run inside a transaction so the read-modify-write of a
//! patch is atomic with respect to other writers.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use finsync_core::EventStore;
use finsync_domain::{
    Event, EventPatch, EventType, FinSyncError, NewEvent, Result, SyncMetadata, SyncSource,
};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::task;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::manager::{DbManager, SqliteConnection};
use crate::errors::InfraError;

const DATE_FORMAT: &str = "%Y-%m-%d";

const EVENT_COLUMNS: &str = "id, title, event_date, event_time, description, event_type,
     provider_id, sync_source, sync_version, last_synced_at";

/// Event store persisted in the local SQLite database.
pub struct SqliteEventRepository {
    db: Arc<DbManager>,
}

impl SqliteEventRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    async fn with_conn<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<T> {
            let mut conn = db.get_connection()?;
            op(&mut conn)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl EventStore for SqliteEventRepository {
    #[instrument(skip(self))]
    async fn list_events_on_date(&self, date: NaiveDate) -> Result<Vec<Event>> {
        self.with_conn(move |conn| {
            let sql = format!(
                "SELECT {EVENT_COLUMNS} FROM events WHERE event_date = ?1 ORDER BY rowid"
            );
            let mut stmt = conn.prepare(&sql).map_err(InfraError::from)?;
            let rows = stmt
                .query_map(params![date.format(DATE_FORMAT).to_string()], map_event_row)
                .map_err(InfraError::from)?;
            let events = rows.collect::<rusqlite::Result<Vec<_>>>().map_err(InfraError::from)?;
            Ok(events)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn find_by_provider_id(&self, provider_id: &str) -> Result<Option<Event>> {
        if provider_id.is_empty() {
            return Ok(None);
        }
        let provider_id = provider_id.to_string();
        self.with_conn(move |conn| {
            let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE provider_id = ?1");
            let event = conn
                .query_row(&sql, params![provider_id], map_event_row)
                .optional()
                .map_err(InfraError::from)?;
            Ok(event)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn get(&self, id: &str) -> Result<Option<Event>> {
        let id = id.to_string();
        self.with_conn(move |conn| load_event(conn, &id)).await
    }

    #[instrument(skip(self, event), fields(date = %event.date))]
    async fn create(&self, event: NewEvent) -> Result<Event> {
        self.with_conn(move |conn| {
            let now = Utc::now().timestamp_millis();
            let id = Uuid::now_v7().to_string();
            let provider_id = event.provider_id.filter(|p| !p.is_empty());

            conn.execute(
                "INSERT INTO events (
                    id, title, event_date, event_time, description, event_type,
                    provider_id, sync_source, sync_version, last_synced_at,
                    created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, ?10, ?10)",
                params![
                    id,
                    event.title,
                    event.date.format(DATE_FORMAT).to_string(),
                    event.time,
                    event.description,
                    event.event_type.map(|t| t.to_string()),
                    provider_id,
                    event.source.to_string(),
                    event.last_synced_at.map(|at| at.timestamp_millis()),
                    now,
                ],
            )
            .map_err(InfraError::from)?;

            debug!(event_id = %id, "event created");

            Ok(Event {
                id,
                title: event.title,
                date: event.date,
                time: event.time,
                description: event.description,
                event_type: event.event_type,
                sync: SyncMetadata {
                    provider_id,
                    source: event.source,
                    version: 0,
                    last_synced_at: event.last_synced_at,
                },
            })
        })
        .await
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: &str, patch: EventPatch) -> Result<()> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let tx = conn.transaction().map_err(InfraError::from)?;

            let mut event = load_event(&tx, &id)?
                .ok_or_else(|| FinSyncError::NotFound(format!("event {id}")))?;
            patch.apply_to(&mut event);

            tx.execute(
                "UPDATE events SET
                    title = ?2, event_date = ?3, event_time = ?4, description = ?5,
                    event_type = ?6, provider_id = ?7, sync_source = ?8,
                    sync_version = ?9, last_synced_at = ?10, updated_at = ?11
                 WHERE id = ?1",
                params![
                    event.id,
                    event.title,
                    event.date.format(DATE_FORMAT).to_string(),
                    event.time,
                    event.description,
                    event.event_type.map(|t| t.to_string()),
                    event.sync.provider_id.as_deref().filter(|p| !p.is_empty()),
                    event.sync.source.to_string(),
                    event.sync.version,
                    event.sync.last_synced_at.map(|at| at.timestamp_millis()),
                    Utc::now().timestamp_millis(),
                ],
            )
            .map_err(InfraError::from)?;

            tx.commit().map_err(InfraError::from)?;
            Ok(())
        })
        .await
    }

    #[instrument(skip(self, synced_at))]
    async fn link_provider(
        &self,
        id: &str,
        provider_id: &str,
        synced_at: DateTime<Utc>,
    ) -> Result<bool> {
        if provider_id.is_empty() {
            return Err(FinSyncError::InvalidInput("empty provider id".into()));
        }
        let id = id.to_string();
        let provider_id = provider_id.to_string();
        self.with_conn(move |conn| {
            let tx = conn.transaction().map_err(InfraError::from)?;

            let changed = tx
                .execute(
                    "UPDATE events SET
                        provider_id = ?2, sync_source = ?3, last_synced_at = ?4, updated_at = ?5
                     WHERE id = ?1
                       AND (provider_id IS NULL OR provider_id = '' OR provider_id = ?2)",
                    params![
                        id,
                        provider_id,
                        SyncSource::Bidirectional.to_string(),
                        synced_at.timestamp_millis(),
                        Utc::now().timestamp_millis(),
                    ],
                )
                .map_err(InfraError::from)?;

            if changed == 0 && load_event(&tx, &id)?.is_none() {
                return Err(FinSyncError::NotFound(format!("event {id}")));
            }

            tx.commit().map_err(InfraError::from)?;
            Ok(changed > 0)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.with_conn(move |conn| {
            let removed = conn
                .execute("DELETE FROM events WHERE id = ?1", params![id])
                .map_err(InfraError::from)?;
            if removed == 0 {
                return Err(FinSyncError::NotFound(format!("event {id}")));
            }
            Ok(())
        })
        .await
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn load_event(conn: &Connection, id: &str) -> Result<Option<Event>> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1");
    let event =
        conn.query_row(&sql, params![id], map_event_row).optional().map_err(InfraError::from)?;
    Ok(event)
}

fn map_event_row(row: &Row) -> rusqlite::Result<Event> {
    let date: String = row.get(2)?;
    let date = NaiveDate::parse_from_str(&date, DATE_FORMAT)
        .map_err(|err| conversion_error(2, err.into()))?;

    let event_type = row
        .get::<_, Option<String>>(5)?
        .map(|raw| EventType::from_str(&raw))
        .transpose()
        .map_err(|err| conversion_error(5, err.into()))?;

    let source: String = row.get(7)?;
    let source = SyncSource::from_str(&source).map_err(|err| conversion_error(7, err.into()))?;

    let last_synced_at = row
        .get::<_, Option<i64>>(9)?
        .map(|ms| {
            DateTime::<Utc>::from_timestamp_millis(ms)
                .ok_or_else(|| conversion_error(9, format!("timestamp out of range: {ms}").into()))
        })
        .transpose()?;

    Ok(Event {
        id: row.get(0)?,
        title: row.get(1)?,
        date,
        time: row.get(3)?,
        description: row.get(4)?,
        event_type,
        sync: SyncMetadata {
            provider_id: row.get(6)?,
            source,
            version: row.get(8)?,
            last_synced_at,
        },
    })
}

fn conversion_error(
    column: usize,
    err: Box<dyn std::error::Error + Send + Sync>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, err)
}

fn map_join_error(err: task::JoinError) -> FinSyncError {
    FinSyncError::Internal(format!("Task join error: {err}"))
}

// =============================================================================
// Tests
// =============================================================================
