//! Best-effort schedule import.
//!
//! Fetches raw course rows from a source, resolves their time strings
//! against the current week, and stores the results with duplicate
//! suppression. A row that fails to resolve is skipped, never fatal: the
//! import reports aggregate counts and the batch continues. Only the
//! start-after-end case is surfaced at WARN, since it indicates malformed
//! upstream data; the other parse failures are logged at DEBUG.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::db::EventDb;
use crate::record::CourseRecord;
use crate::resolver::SlotResolver;
use crate::source::{RawCourse, ScheduleSource, SourceError};

/// Errors that abort a whole import batch.
///
/// Per-record parse failures are not here on purpose: they are counted in
/// [`ImportOutcome::skipped`] instead.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The source could not supply any rows
    #[error("Schedule source failed: {0}")]
    Source(#[from] SourceError),

    /// The event store rejected an operation
    #[error("Event store failed: {0}")]
    Store(#[from] rusqlite::Error),
}

/// Aggregate result of one import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    /// Rows supplied by the source
    pub fetched: usize,
    /// Rows resolved and newly stored
    pub imported: usize,
    /// Rows resolved but already present under the same `(title, start)`
    pub duplicates: usize,
    /// Rows whose time string failed to resolve
    pub skipped: usize,
}

/// Resolves and stores schedule rows from a source.
pub struct Importer {
    resolver: SlotResolver,
}

impl Importer {
    pub fn new(resolver: SlotResolver) -> Self {
        Self { resolver }
    }

    /// Imports all rows from `source`, anchored to the current week.
    pub async fn import<S>(&self, source: &S, db: &EventDb) -> Result<ImportOutcome, ImportError>
    where
        S: ScheduleSource + ?Sized,
    {
        self.import_relative_to(source, db, Local::now()).await
    }

    /// Imports all rows from `source`, anchored to the ISO week of
    /// `reference`.
    pub async fn import_relative_to<S, Tz>(
        &self,
        source: &S,
        db: &EventDb,
        reference: DateTime<Tz>,
    ) -> Result<ImportOutcome, ImportError>
    where
        S: ScheduleSource + ?Sized,
        Tz: TimeZone,
    {
        let rows = source.fetch().await?;
        let mut outcome = ImportOutcome {
            fetched: rows.len(),
            ..Default::default()
        };

        for row in rows {
            let Some(record) = self.resolve_row(&row, &reference) else {
                outcome.skipped += 1;
                continue;
            };

            if db.insert_if_absent(&record)? {
                outcome.imported += 1;
            } else {
                debug!(title = %record.title, "Skipping duplicate event");
                outcome.duplicates += 1;
            }
        }

        info!(
            fetched = outcome.fetched,
            imported = outcome.imported,
            duplicates = outcome.duplicates,
            skipped = outcome.skipped,
            "Import finished"
        );
        Ok(outcome)
    }

    fn resolve_row<Tz: TimeZone>(
        &self,
        row: &RawCourse,
        reference: &DateTime<Tz>,
    ) -> Option<CourseRecord> {
        let range = match self.resolver.resolve(&row.time_string, reference) {
            Ok(range) => range,
            Err(err) if err.is_reportable() => {
                warn!(title = %row.title, time_string = %row.time_string, %err, "Dropping course row");
                return None;
            }
            Err(err) => {
                debug!(title = %row.title, time_string = %row.time_string, %err, "Dropping course row");
                return None;
            }
        };

        let teacher = (!row.teacher.is_empty()).then(|| row.teacher.clone());

        Some(CourseRecord {
            title: row.title.clone(),
            location: row.location.clone(),
            teacher,
            notes: None,
            start: range.start.with_timezone(&Utc),
            end: range.end.with_timezone(&Utc),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockPortalSource;
    use async_trait::async_trait;

    struct StaticSource(Vec<RawCourse>);

    #[async_trait]
    impl ScheduleSource for StaticSource {
        async fn fetch(&self) -> Result<Vec<RawCourse>, SourceError> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl ScheduleSource for FailingSource {
        async fn fetch(&self) -> Result<Vec<RawCourse>, SourceError> {
            Err(SourceError::NoTimetable)
        }
    }

    fn raw(title: &str, time_string: &str) -> RawCourse {
        RawCourse {
            title: title.to_string(),
            time_string: time_string.to_string(),
            location: "教B-201".to_string(),
            teacher: "张伟".to_string(),
        }
    }

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 17, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_imports_full_fixture() {
        let importer = Importer::new(SlotResolver::standard());
        let db = EventDb::open_in_memory().unwrap();

        let outcome = importer
            .import_relative_to(&MockPortalSource, &db, reference())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ImportOutcome {
                fetched: 7,
                imported: 7,
                duplicates: 0,
                skipped: 0
            }
        );
        assert_eq!(db.all_events().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_reimport_is_idempotent() {
        let importer = Importer::new(SlotResolver::standard());
        let db = EventDb::open_in_memory().unwrap();

        importer
            .import_relative_to(&MockPortalSource, &db, reference())
            .await
            .unwrap();
        let second = importer
            .import_relative_to(&MockPortalSource, &db, reference())
            .await
            .unwrap();

        assert_eq!(second.imported, 0);
        assert_eq!(second.duplicates, 7);
        assert_eq!(db.all_events().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_bad_rows_are_skipped_and_batch_continues() {
        let importer = Importer::new(SlotResolver::standard());
        let db = EventDb::open_in_memory().unwrap();
        let source = StaticSource(vec![
            raw("好课", "星期一 3-4节"),
            raw("无空格", "星期一3-4节"),
            raw("倒序", "星期一 5-3节"),
            raw("未知周", "周八 3-4节"),
            raw("另一门好课", "星期二 1-2节"),
        ]);

        let outcome = importer
            .import_relative_to(&source, &db, reference())
            .await
            .unwrap();

        assert_eq!(outcome.fetched, 5);
        assert_eq!(outcome.imported, 2);
        assert_eq!(outcome.skipped, 3);

        let titles: Vec<String> = db
            .all_events()
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, ["好课", "另一门好课"]);
    }

    #[tokio::test]
    async fn test_empty_teacher_becomes_none() {
        let importer = Importer::new(SlotResolver::standard());
        let db = EventDb::open_in_memory().unwrap();
        let mut row = raw("大学体育", "星期四 3-4节");
        row.teacher = String::new();

        importer
            .import_relative_to(&StaticSource(vec![row]), &db, reference())
            .await
            .unwrap();

        assert_eq!(db.all_events().unwrap()[0].teacher, None);
    }

    #[tokio::test]
    async fn test_source_failure_aborts_batch() {
        let importer = Importer::new(SlotResolver::standard());
        let db = EventDb::open_in_memory().unwrap();

        let result = importer
            .import_relative_to(&FailingSource, &db, reference())
            .await;

        assert!(matches!(
            result,
            Err(ImportError::Source(SourceError::NoTimetable))
        ));
        assert!(db.all_events().unwrap().is_empty());
    }
}
