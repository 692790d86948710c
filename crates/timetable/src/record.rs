//! The resolved, UI-independent course event representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A fully resolved course event, ready for the event store.
///
/// Created by pairing a schedule source row with the slot resolver, then
/// consumed once by [`crate::db::EventDb::insert_if_absent`] keyed on
/// `(title, start)`. Teacher and notes are optional: manually entered
/// events may carry neither, and their absence never affects dedup logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub title: String,
    pub location: String,
    pub teacher: Option<String>,
    pub notes: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}
