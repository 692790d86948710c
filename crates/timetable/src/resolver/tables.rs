//! Lookup tables for the slot resolver.
//!
//! Both tables are immutable, process-wide configuration data: they are
//! validated once at construction and never mutated afterwards.

use super::error::TableError;
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Start-of-period clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotTime {
    pub hour: u32,
    pub minute: u32,
}

impl SlotTime {
    fn minutes_of_day(&self) -> u32 {
        self.hour * 60 + self.minute
    }
}

/// Immutable mapping from period index (1..N) to start-of-period clock time.
///
/// Invariant, checked at construction: period `k`'s start strictly precedes
/// period `k + 1`'s start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotTimeTable {
    slots: BTreeMap<u32, SlotTime>,
}

impl SlotTimeTable {
    /// Builds a table from `(period, hour, minute)` entries.
    pub fn new<I>(entries: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (u32, u32, u32)>,
    {
        let mut slots = BTreeMap::new();
        for (period, hour, minute) in entries {
            if hour >= 24 || minute >= 60 {
                return Err(TableError::InvalidClockTime {
                    period,
                    hour,
                    minute,
                });
            }
            slots.insert(period, SlotTime { hour, minute });
        }

        if slots.is_empty() {
            return Err(TableError::EmptySlotTable);
        }

        // Starts must be strictly increasing by period index.
        let mut prev: Option<(u32, SlotTime)> = None;
        for (&period, &time) in &slots {
            if let Some((prev_period, prev_time)) = prev {
                if time.minutes_of_day() <= prev_time.minutes_of_day() {
                    return Err(TableError::NonMonotonicPeriods {
                        previous: prev_period,
                        period,
                    });
                }
            }
            prev = Some((period, time));
        }

        Ok(Self { slots })
    }

    /// The standard 12-period timetable used by the mock portal data.
    pub fn standard() -> Self {
        Self::new([
            (1, 8, 0),
            (2, 8, 50),
            (3, 9, 50),
            (4, 10, 40),
            (5, 11, 30),
            (6, 14, 0),
            (7, 14, 50),
            (8, 15, 50),
            (9, 16, 40),
            (10, 18, 30),
            (11, 19, 20),
            (12, 20, 10),
        ])
        .unwrap()
    }

    /// Looks up the start-of-period clock time for a period index.
    pub fn get(&self, period: u32) -> Option<SlotTime> {
        self.slots.get(&period).copied()
    }

    /// Iterates over all period indices in the table.
    pub fn periods(&self) -> impl Iterator<Item = u32> + '_ {
        self.slots.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for SlotTimeTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Immutable mapping from a weekday name token to an ISO weekday.
#[derive(Debug, Clone)]
pub struct WeekdayTable {
    names: HashMap<String, Weekday>,
}

impl WeekdayTable {
    /// Builds a table from `(token, weekday)` pairs.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Weekday)>,
        S: Into<String>,
    {
        Self {
            names: entries
                .into_iter()
                .map(|(token, day)| (token.into(), day))
                .collect(),
        }
    }

    /// Simplified-Chinese weekday names (the portal's convention).
    pub fn chinese() -> Self {
        Self::new([
            ("星期一", Weekday::Mon),
            ("星期二", Weekday::Tue),
            ("星期三", Weekday::Wed),
            ("星期四", Weekday::Thu),
            ("星期五", Weekday::Fri),
            ("星期六", Weekday::Sat),
            ("星期日", Weekday::Sun),
        ])
    }

    /// Looks up the ISO weekday for a name token.
    pub fn get(&self, token: &str) -> Option<Weekday> {
        self.names.get(token).copied()
    }
}

impl Default for WeekdayTable {
    fn default() -> Self {
        Self::chinese()
    }
}
