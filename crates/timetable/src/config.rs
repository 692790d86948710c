/// Application configuration
use chrono::{Duration, Weekday};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::resolver::{SlotResolver, SlotTimeTable, TableError, WeekdayTable};
use crate::source::PortalConfig;

/// Which schedule source the import endpoint uses.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// The built-in development fixture
    #[default]
    Mock,
    /// A live web portal (requires the `portal` section)
    Portal,
}

/// One slot-table entry in the configuration file.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SlotEntry {
    pub period: u32,
    pub hour: u32,
    pub minute: u32,
}

/// Top-level application configuration, loaded from a JSON file.
///
/// Every field has a default, so an empty object (or a missing file) yields
/// a runnable mock-source configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Path of the SQLite event database
    pub db_path: String,
    /// Directory the ICS exporter writes into
    pub export_dir: String,
    /// Class length added past the nominal end-of-period start time
    pub class_duration_minutes: i64,
    /// First weekday of month grids ("mon", "sun", ...)
    pub first_weekday: String,
    /// Schedule source selection
    pub source: SourceKind,
    /// Portal settings, required when `source` is `portal`
    pub portal: Option<PortalConfig>,
    /// Overrides the standard period timetable when present
    pub slots: Option<Vec<SlotEntry>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            db_path: "events.db".to_string(),
            export_dir: "exported".to_string(),
            class_duration_minutes: 45,
            first_weekday: "mon".to_string(),
            source: SourceKind::Mock,
            portal: None,
            slots: None,
        }
    }
}

/// Errors raised while loading or validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid slot table: {0}")]
    Table(#[from] TableError),

    #[error("Unrecognized first_weekday: {value:?}")]
    FirstWeekday { value: String },

    #[error("source = \"portal\" requires a portal section")]
    MissingPortal,
}

impl AppConfig {
    /// Loads configuration from a JSON file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.first_weekday()?;
        self.build_resolver()?;
        if self.source == SourceKind::Portal && self.portal.is_none() {
            return Err(ConfigError::MissingPortal);
        }
        Ok(())
    }

    /// Builds the slot resolver described by this configuration.
    pub fn build_resolver(&self) -> Result<SlotResolver, ConfigError> {
        let slots = match &self.slots {
            Some(entries) => SlotTimeTable::new(
                entries.iter().map(|e| (e.period, e.hour, e.minute)),
            )?,
            None => SlotTimeTable::standard(),
        };

        let resolver = SlotResolver::new(
            WeekdayTable::chinese(),
            slots,
            Duration::minutes(self.class_duration_minutes),
        )?;
        Ok(resolver)
    }

    /// The configured first weekday for month grids.
    pub fn first_weekday(&self) -> Result<Weekday, ConfigError> {
        self.first_weekday
            .parse::<Weekday>()
            .map_err(|_| ConfigError::FirstWeekday {
                value: self.first_weekday.clone(),
            })
    }
}
