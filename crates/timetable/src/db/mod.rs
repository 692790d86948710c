/// Database module for managing resolved course events

mod types;

pub use types::StoredEvent;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Result};
use std::sync::Mutex;

use crate::record::CourseRecord;

const SCHEMA_SQL: &str = include_str!("../../../../sql/init_events.sql");

const EVENT_COLUMNS: &str =
    "event_id, title, location, teacher, notes, start_at, end_at";

/// The persisted event store.
///
/// Duplicate suppression is keyed on `(title, start_at)` via a unique
/// constraint: importing the same course twice stores exactly one row.
pub struct EventDb {
    db: Mutex<Connection>,
}

impl EventDb {
    /// Opens (or creates) the event database and initializes the schema.
    pub fn open(db_path: &str) -> Result<Self> {
        Self::from_connection(Connection::open(db_path)?)
    }

    /// Opens an in-memory event database, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    /// Inserts a record unless an event with the same `(title, start)` pair
    /// already exists. Returns whether a row was actually inserted.
    pub fn insert_if_absent(&self, record: &CourseRecord) -> Result<bool> {
        let db = self.db.lock().unwrap();
        let inserted = db.execute(
            "INSERT OR IGNORE INTO events (title, location, teacher, notes, start_at, end_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, datetime('now'))",
            (
                &record.title,
                &record.location,
                &record.teacher,
                &record.notes,
                record.start,
                record.end,
            ),
        )?;
        Ok(inserted > 0)
    }

    /// The duplicate-check query: does an event with this exact
    /// `(title, start)` already exist?
    pub fn exists(&self, title: &str, start: DateTime<Utc>) -> Result<bool> {
        let db = self.db.lock().unwrap();
        let found: Option<i64> = db
            .query_row(
                "SELECT event_id FROM events WHERE title = ?1 AND start_at = ?2",
                (title, start),
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// All stored events, sorted by start time.
    pub fn all_events(&self) -> Result<Vec<StoredEvent>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY start_at"
        ))?;

        let events = stmt.query_map([], row_to_event)?;
        events.collect()
    }

    /// Events with `from <= start < to`, sorted by start time.
    pub fn events_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<StoredEvent>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(&format!(
            "SELECT {EVENT_COLUMNS} FROM events
             WHERE start_at >= ?1 AND start_at < ?2
             ORDER BY start_at"
        ))?;

        let events = stmt.query_map((from, to), row_to_event)?;
        events.collect()
    }

    /// Removes one event. Returns whether it existed.
    pub fn remove(&self, event_id: i64) -> Result<bool> {
        let db = self.db.lock().unwrap();
        let removed = db.execute("DELETE FROM events WHERE event_id = ?1", [event_id])?;
        Ok(removed > 0)
    }
}

fn row_to_event(row: &rusqlite::Row<'_>) -> Result<StoredEvent> {
    Ok(StoredEvent {
        event_id: row.get(0)?,
        title: row.get(1)?,
        location: row.get(2)?,
        teacher: row.get(3)?,
        notes: row.get(4)?,
        start: row.get(5)?,
        end: row.get(6)?,
    })
}
