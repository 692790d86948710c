/// Database types for stored course events
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::record::CourseRecord;

/// A course event row as stored in the events table.
#[derive(Debug, Clone, Serialize)]
pub struct StoredEvent {
    pub event_id: i64,
    pub title: String,
    pub location: String,
    pub teacher: Option<String>,
    pub notes: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl From<StoredEvent> for CourseRecord {
    fn from(event: StoredEvent) -> Self {
        CourseRecord {
            title: event.title,
            location: event.location,
            teacher: event.teacher,
            notes: event.notes,
            start: event.start,
            end: event.end,
        }
    }
}
