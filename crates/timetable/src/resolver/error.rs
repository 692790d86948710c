//! Error types for time-string resolution.

use thiserror::Error;

/// Errors that can occur while resolving a schedule time string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The string does not split into exactly two whitespace-separated fields
    #[error("Malformed time string: {value:?}")]
    MalformedTimeString { value: String },

    /// The weekday token is not present in the weekday table
    #[error("Unknown weekday token: {token:?}")]
    UnknownWeekday { token: String },

    /// The period range (after stripping the suffix) is not two integers
    /// joined by `-`
    #[error("Malformed period range: {value:?}")]
    MalformedPeriodRange { value: String },

    /// A period index is not present in the slot time table
    #[error("Period {period} not in slot table")]
    UnknownPeriod { period: u32 },

    /// The start period is strictly greater than the end period
    #[error("Invalid range: start period {start} after end period {end}")]
    StartAfterEnd { start: u32, end: u32 },

    /// The resolved wall-clock time cannot be represented in the target
    /// timezone (DST gap or ambiguity)
    #[error("Unrepresentable local time for {time_string:?}")]
    InvalidDate { time_string: String },
}

impl ResolveError {
    /// Returns true if this failure is worth surfacing to an operator log.
    ///
    /// Only the start-after-end case indicates malformed upstream data;
    /// every other case is a silent per-record skip.
    pub fn is_reportable(&self) -> bool {
        matches!(self, ResolveError::StartAfterEnd { .. })
    }
}

/// Errors raised while constructing resolver lookup tables.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    /// The slot table has no entries
    #[error("Slot table is empty")]
    EmptySlotTable,

    /// A clock field is out of range
    #[error("Period {period} has invalid clock time {hour:02}:{minute:02}")]
    InvalidClockTime { period: u32, hour: u32, minute: u32 },

    /// Period starts are not strictly increasing by period index
    #[error("Period {period} does not start after period {previous}")]
    NonMonotonicPeriods { previous: u32, period: u32 },

    /// The configured class duration is zero or negative
    #[error("Class duration must be positive, got {minutes} minutes")]
    NonPositiveDuration { minutes: i64 },
}
