//! Schedule sources: suppliers of raw, unresolved course rows.

mod mock;
mod portal;

pub use mock::MockPortalSource;
pub use portal::{PortalConfig, WebPortalSource};

use async_trait::async_trait;
use thiserror::Error;

/// A raw course row as supplied by a portal, before time resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCourse {
    pub title: String,
    pub time_string: String,
    pub location: String,
    pub teacher: String,
}

/// Errors that can occur while fetching schedule rows.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network/HTTP request failed
    #[error("Network error: {message}")]
    Network { message: String },

    /// The portal rejected the supplied credentials
    #[error("Login failed with status {status}")]
    LoginFailed { status: u16 },

    /// The page did not contain a recognizable timetable
    #[error("No timetable found in portal page")]
    NoTimetable,

    /// URL construction failed
    #[error("URL error: {message}")]
    UrlError { message: String },
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for SourceError {
    fn from(err: url::ParseError) -> Self {
        SourceError::UrlError {
            message: err.to_string(),
        }
    }
}

/// Trait implemented by every supplier of schedule rows.
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// Fetches all raw course rows from the source.
    async fn fetch(&self) -> Result<Vec<RawCourse>, SourceError>;
}
