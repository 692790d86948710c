//! Calendar export with per-item failure isolation.
//!
//! An exporter is one destination (an ICS directory, a platform calendar
//! store, ...). The batch contract is identical for all of them: check the
//! coarse authorization state once, ask for consent if never asked, then
//! submit every event as an independent attempt and report aggregate
//! `(success, failure)` counts. One failed item never aborts the batch.

mod ics;

pub use ics::IcsFileExporter;

use async_trait::async_trait;
use futures::future::join_all;
use serde::Serialize;
use tracing::warn;

use crate::record::CourseRecord;

/// Coarse authorization state of an export destination, queried once per
/// batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    /// Access granted; export may proceed
    Authorized,
    /// Never asked; a one-time consent request precedes the batch
    NotDetermined,
    /// Access explicitly refused
    Denied,
    /// Access blocked by policy outside the user's control
    Restricted,
}

/// Aggregate result of one export batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExportOutcome {
    pub success: usize,
    pub failure: usize,
}

/// A calendar export destination.
#[async_trait]
pub trait CalendarExporter: Send + Sync {
    /// Current authorization state for this destination.
    fn authorization_status(&self) -> AuthorizationStatus;

    /// One-time consent request; returns whether access was granted.
    async fn request_access(&self) -> bool;

    /// Attempts to write a single event. Failures are reported, not
    /// retried.
    async fn save_event(&self, record: &CourseRecord) -> bool;

    /// Exports a batch of events.
    ///
    /// Submits one independent save per event and waits for all of them;
    /// no ordering guarantee among attempts.
    async fn export(&self, records: &[CourseRecord]) -> ExportOutcome {
        match self.authorization_status() {
            AuthorizationStatus::Authorized => {}
            AuthorizationStatus::NotDetermined => {
                if !self.request_access().await {
                    return all_failed(records.len());
                }
            }
            AuthorizationStatus::Denied | AuthorizationStatus::Restricted => {
                warn!("Calendar access denied or restricted; export aborted");
                return all_failed(records.len());
            }
        }

        let attempts = join_all(records.iter().map(|record| self.save_event(record))).await;
        let success = attempts.into_iter().filter(|&ok| ok).count();

        ExportOutcome {
            success,
            failure: records.len() - success,
        }
    }
}

fn all_failed(count: usize) -> ExportOutcome {
    ExportOutcome {
        success: 0,
        failure: count,
    }
}
