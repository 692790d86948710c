//! ICS file export destination.
//!
//! Writes one `.ics` file per event into a target directory. The directory
//! plays the role of the platform calendar store: a missing directory is
//! "not yet asked" (consent creates it), and a path occupied by a plain
//! file is "restricted".

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{AuthorizationStatus, CalendarExporter};
use crate::record::CourseRecord;

/// Exports events as individual `.ics` files.
pub struct IcsFileExporter {
    dir: PathBuf,
}

impl IcsFileExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stable per-event file stem derived from the dedup key.
    ///
    /// The `(title, start)` pair is hashed so re-exports overwrite the same
    /// file instead of accumulating copies.
    fn event_uid(record: &CourseRecord) -> String {
        let mut hasher = Sha256::new();
        hasher.update(record.title.as_bytes());
        hasher.update(b"\n");
        hasher.update(record.start.to_rfc3339().as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..16])
    }
}

#[async_trait]
impl CalendarExporter for IcsFileExporter {
    fn authorization_status(&self) -> AuthorizationStatus {
        if self.dir.is_dir() {
            AuthorizationStatus::Authorized
        } else if self.dir.exists() {
            AuthorizationStatus::Restricted
        } else {
            AuthorizationStatus::NotDetermined
        }
    }

    async fn request_access(&self) -> bool {
        match tokio::fs::create_dir_all(&self.dir).await {
            Ok(()) => true,
            Err(err) => {
                warn!("Failed to create export directory {:?}: {err}", self.dir);
                false
            }
        }
    }

    async fn save_event(&self, record: &CourseRecord) -> bool {
        let uid = Self::event_uid(record);
        let path = self.dir.join(format!("{uid}.ics"));

        match tokio::fs::write(&path, render_vevent(record, &uid)).await {
            Ok(()) => {
                debug!(title = %record.title, ?path, "Wrote calendar file");
                true
            }
            Err(err) => {
                warn!(title = %record.title, "Failed to save event: {err}");
                false
            }
        }
    }
}

/// Renders a single-event VCALENDAR document.
fn render_vevent(record: &CourseRecord, uid: &str) -> String {
    let mut description = record.teacher.clone().unwrap_or_default();
    if let Some(notes) = &record.notes {
        if !description.is_empty() {
            description.push('\n');
        }
        description.push_str(notes);
    }

    let mut out = String::new();
    out.push_str("BEGIN:VCALENDAR\r\n");
    out.push_str("VERSION:2.0\r\n");
    out.push_str("PRODID:-//timetable//EN\r\n");
    out.push_str("BEGIN:VEVENT\r\n");
    out.push_str(&format!("UID:{uid}@timetable\r\n"));
    out.push_str(&format!("DTSTAMP:{}\r\n", format_utc(Utc::now())));
    out.push_str(&format!("DTSTART:{}\r\n", format_utc(record.start)));
    out.push_str(&format!("DTEND:{}\r\n", format_utc(record.end)));
    out.push_str(&format!("SUMMARY:{}\r\n", escape_text(&record.title)));
    out.push_str(&format!("LOCATION:{}\r\n", escape_text(&record.location)));
    if !description.is_empty() {
        out.push_str(&format!("DESCRIPTION:{}\r\n", escape_text(&description)));
    }
    out.push_str("END:VEVENT\r\n");
    out.push_str("END:VCALENDAR\r\n");
    out
}

fn format_utc(instant: DateTime<Utc>) -> String {
    instant.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Escapes TEXT values per RFC 5545 §3.3.11.
fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Helper module for hex encoding (avoiding extra dependency).
mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportOutcome;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn record(title: &str) -> CourseRecord {
        CourseRecord {
            title: title.to_string(),
            location: "教B-201".to_string(),
            teacher: Some("张伟".to_string()),
            notes: None,
            start: Utc.with_ymd_and_hms(2025, 9, 15, 9, 50, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 9, 15, 11, 25, 0).unwrap(),
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        static COUNTER: AtomicU32 = AtomicU32::new(0);
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!(
            "timetable-ics-{name}-{}-{n}",
            std::process::id()
        ))
    }

    #[tokio::test]
    async fn test_consent_creates_directory_then_exports() {
        let dir = scratch_dir("consent");
        let exporter = IcsFileExporter::new(&dir);

        assert_eq!(
            exporter.authorization_status(),
            AuthorizationStatus::NotDetermined
        );

        let outcome = exporter.export(&[record("高级软件工程")]).await;
        assert_eq!(outcome, ExportOutcome { success: 1, failure: 0 });
        assert_eq!(
            exporter.authorization_status(),
            AuthorizationStatus::Authorized
        );

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_written_file_content() {
        let dir = scratch_dir("content");
        let exporter = IcsFileExporter::new(&dir);
        let rec = record("高级软件工程");

        exporter.export(std::slice::from_ref(&rec)).await;

        let uid = IcsFileExporter::event_uid(&rec);
        let content = tokio::fs::read_to_string(dir.join(format!("{uid}.ics")))
            .await
            .unwrap();

        assert!(content.contains("BEGIN:VEVENT"));
        assert!(content.contains("SUMMARY:高级软件工程"));
        assert!(content.contains("DTSTART:20250915T095000Z"));
        assert!(content.contains("DTEND:20250915T112500Z"));
        assert!(content.contains("DESCRIPTION:张伟"));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_reexport_overwrites_instead_of_duplicating() {
        let dir = scratch_dir("overwrite");
        let exporter = IcsFileExporter::new(&dir);
        let batch = vec![record("a"), record("b")];

        exporter.export(&batch).await;
        exporter.export(&batch).await;

        let mut entries = tokio::fs::read_dir(&dir).await.unwrap();
        let mut count = 0;
        while entries.next_entry().await.unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, 2);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_path_occupied_by_file_is_restricted() {
        let dir = scratch_dir("blocked");
        tokio::fs::write(&dir, b"not a directory").await.unwrap();
        let exporter = IcsFileExporter::new(&dir);

        assert_eq!(
            exporter.authorization_status(),
            AuthorizationStatus::Restricted
        );
        let outcome = exporter.export(&[record("a")]).await;
        assert_eq!(outcome, ExportOutcome { success: 0, failure: 1 });

        tokio::fs::remove_file(&dir).await.unwrap();
    }

    #[test]
    fn test_uid_is_stable_and_key_sensitive() {
        let a = record("a");
        let b = record("b");

        assert_eq!(IcsFileExporter::event_uid(&a), IcsFileExporter::event_uid(&a));
        assert_ne!(IcsFileExporter::event_uid(&a), IcsFileExporter::event_uid(&b));

        // The end time is not part of the dedup key.
        let mut a_longer = record("a");
        a_longer.end = Utc.with_ymd_and_hms(2025, 9, 15, 12, 0, 0).unwrap();
        assert_eq!(
            IcsFileExporter::event_uid(&a),
            IcsFileExporter::event_uid(&a_longer)
        );
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a,b;c\\d\ne"), "a\\,b\\;c\\\\d\\ne");
    }
}
