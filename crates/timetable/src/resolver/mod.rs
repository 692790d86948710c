//! Slot resolver: converts symbolic schedule time strings into concrete
//! timezone-aware timestamp ranges.
//!
//! A time string has the form `<weekday> <start>-<end>节`, e.g.
//! `星期一 3-4节`. Resolution anchors the result to the ISO week containing
//! a caller-supplied reference date, so "Monday" always means the Monday of
//! that week regardless of month or year boundaries.

mod error;
mod tables;

pub use error::{ResolveError, TableError};
pub use tables::{SlotTime, SlotTimeTable, WeekdayTable};

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Weekday};

/// Default length of one class past its nominal end-of-period start time.
const DEFAULT_CLASS_DURATION_MINUTES: i64 = 45;

/// A concrete start/end timestamp pair. Invariant: `start < end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTimeRange<Tz: TimeZone> {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

/// Resolves schedule time strings against injected lookup tables.
///
/// Pure and synchronous; all validation failures are reported as typed
/// errors rather than logged here, so callers decide what is worth
/// surfacing (see [`ResolveError::is_reportable`]).
#[derive(Debug, Clone)]
pub struct SlotResolver {
    weekdays: WeekdayTable,
    slots: SlotTimeTable,
    class_duration: Duration,
}

impl SlotResolver {
    /// Creates a resolver from validated tables and a class duration.
    ///
    /// The duration must be positive so that a single-period range
    /// (`start == end` period) still yields `start < end`.
    pub fn new(
        weekdays: WeekdayTable,
        slots: SlotTimeTable,
        class_duration: Duration,
    ) -> Result<Self, TableError> {
        if class_duration <= Duration::zero() {
            return Err(TableError::NonPositiveDuration {
                minutes: class_duration.num_minutes(),
            });
        }

        Ok(Self {
            weekdays,
            slots,
            class_duration,
        })
    }

    /// Creates a resolver with the standard tables and a 45-minute class
    /// duration.
    pub fn standard() -> Self {
        Self::new(
            WeekdayTable::chinese(),
            SlotTimeTable::standard(),
            Duration::minutes(DEFAULT_CLASS_DURATION_MINUTES),
        )
        .unwrap()
    }

    pub fn slots(&self) -> &SlotTimeTable {
        &self.slots
    }

    /// Resolves a time string into a timestamp range within the ISO week of
    /// `reference`.
    ///
    /// `reference` contributes only its ISO (year, week) pair and timezone;
    /// its clock time is ignored.
    pub fn resolve<Tz: TimeZone>(
        &self,
        time_string: &str,
        reference: &DateTime<Tz>,
    ) -> Result<ResolvedTimeRange<Tz>, ResolveError> {
        let fields: Vec<&str> = time_string.split_whitespace().collect();
        let [weekday_token, slot_field] = fields[..] else {
            return Err(ResolveError::MalformedTimeString {
                value: time_string.to_string(),
            });
        };

        let weekday = self.weekdays.get(weekday_token).ok_or_else(|| {
            ResolveError::UnknownWeekday {
                token: weekday_token.to_string(),
            }
        })?;

        let (start_period, end_period) = parse_period_range(slot_field)?;

        if start_period > end_period {
            return Err(ResolveError::StartAfterEnd {
                start: start_period,
                end: end_period,
            });
        }

        let start_time = self
            .slots
            .get(start_period)
            .ok_or(ResolveError::UnknownPeriod {
                period: start_period,
            })?;
        let end_time = self
            .slots
            .get(end_period)
            .ok_or(ResolveError::UnknownPeriod { period: end_period })?;

        let target_date = weekday_in_same_iso_week(reference, weekday)
            .ok_or_else(|| invalid_date(time_string))?;

        let start_naive = target_date
            .and_hms_opt(start_time.hour, start_time.minute, 0)
            .ok_or_else(|| invalid_date(time_string))?;
        let end_naive = target_date
            .and_hms_opt(end_time.hour, end_time.minute, 0)
            .and_then(|dt| dt.checked_add_signed(self.class_duration))
            .ok_or_else(|| invalid_date(time_string))?;

        let tz = reference.timezone();
        let start = tz
            .from_local_datetime(&start_naive)
            .single()
            .ok_or_else(|| invalid_date(time_string))?;
        let end = tz
            .from_local_datetime(&end_naive)
            .single()
            .ok_or_else(|| invalid_date(time_string))?;

        Ok(ResolvedTimeRange { start, end })
    }
}

impl Default for SlotResolver {
    fn default() -> Self {
        Self::standard()
    }
}

/// Parses the `<start>-<end>节` field into two period indices.
///
/// The final character is always stripped as the suffix marker, matching
/// the portal's format, so the parser itself is suffix-agnostic.
fn parse_period_range(field: &str) -> Result<(u32, u32), ResolveError> {
    let malformed = || ResolveError::MalformedPeriodRange {
        value: field.to_string(),
    };

    let (suffix_start, _) = field.char_indices().last().ok_or_else(malformed)?;
    let stripped = &field[..suffix_start];

    let parts: Vec<&str> = stripped.split('-').collect();
    let [start_str, end_str] = parts[..] else {
        return Err(malformed());
    };

    let start = start_str.parse::<u32>().map_err(|_| malformed())?;
    let end = end_str.parse::<u32>().map_err(|_| malformed())?;

    Ok((start, end))
}

/// The date of `weekday` within the ISO week containing `reference`.
fn weekday_in_same_iso_week<Tz: TimeZone>(
    reference: &DateTime<Tz>,
    weekday: Weekday,
) -> Option<NaiveDate> {
    let iso = reference.iso_week();
    NaiveDate::from_isoywd_opt(iso.year(), iso.week(), weekday)
}

fn invalid_date(time_string: &str) -> ResolveError {
    ResolveError::InvalidDate {
        time_string: time_string.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    /// Wednesday 2025-09-17; the Monday of its ISO week is 2025-09-15.
    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 17, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_resolve_monday_slots_3_to_4() {
        let resolver = SlotResolver::standard();
        let range = resolver.resolve("星期一 3-4节", &reference()).unwrap();

        assert_eq!(range.start, Utc.with_ymd_and_hms(2025, 9, 15, 9, 50, 0).unwrap());
        // Slot 4 starts 10:40; plus the 45-minute class duration.
        assert_eq!(range.end, Utc.with_ymd_and_hms(2025, 9, 15, 11, 25, 0).unwrap());
    }

    #[test]
    fn test_resolve_tuesday_slots_1_to_2() {
        let resolver = SlotResolver::standard();
        let range = resolver.resolve("星期二 1-2节", &reference()).unwrap();

        assert_eq!(range.start, Utc.with_ymd_and_hms(2025, 9, 16, 8, 0, 0).unwrap());
        assert_eq!(range.end, Utc.with_ymd_and_hms(2025, 9, 16, 9, 35, 0).unwrap());
    }

    #[test]
    fn test_all_valid_combinations_start_before_end() {
        let resolver = SlotResolver::standard();
        let tokens = [
            "星期一", "星期二", "星期三", "星期四", "星期五", "星期六", "星期日",
        ];

        for token in tokens {
            let periods: Vec<u32> = resolver.slots().periods().collect();
            for &start in &periods {
                for &end in periods.iter().filter(|&&p| p >= start) {
                    let s = format!("{token} {start}-{end}节");
                    let range = resolver.resolve(&s, &reference()).unwrap();
                    assert!(range.start < range.end, "{s} produced an empty range");
                }
            }
        }
    }

    #[test]
    fn test_single_period_range_is_valid() {
        let resolver = SlotResolver::standard();
        let range = resolver.resolve("星期三 5-5节", &reference()).unwrap();

        assert_eq!(range.start, Utc.with_ymd_and_hms(2025, 9, 17, 11, 30, 0).unwrap());
        assert_eq!(range.end, Utc.with_ymd_and_hms(2025, 9, 17, 12, 15, 0).unwrap());
    }

    #[test]
    fn test_rejects_wrong_field_count() {
        let resolver = SlotResolver::standard();

        for s in ["星期一3-4节", "星期一 3-4节 extra", "", "   "] {
            assert!(matches!(
                resolver.resolve(s, &reference()),
                Err(ResolveError::MalformedTimeString { .. })
            ));
        }
    }

    #[test]
    fn test_rejects_unknown_weekday() {
        let resolver = SlotResolver::standard();
        assert_eq!(
            resolver.resolve("周八 3-4节", &reference()),
            Err(ResolveError::UnknownWeekday {
                token: "周八".to_string()
            })
        );
    }

    #[test]
    fn test_rejects_malformed_period_range() {
        let resolver = SlotResolver::standard();

        for s in ["星期一 节", "星期一 3节", "星期一 3-4-5节", "星期一 a-b节"] {
            assert!(matches!(
                resolver.resolve(s, &reference()),
                Err(ResolveError::MalformedPeriodRange { .. })
            ));
        }
    }

    #[test]
    fn test_rejects_unknown_period() {
        let resolver = SlotResolver::standard();
        assert_eq!(
            resolver.resolve("星期一 13-14节", &reference()),
            Err(ResolveError::UnknownPeriod { period: 13 })
        );
    }

    #[test]
    fn test_start_after_end_is_distinct_and_reportable() {
        let resolver = SlotResolver::standard();
        let err = resolver.resolve("星期一 5-3节", &reference()).unwrap_err();

        assert_eq!(err, ResolveError::StartAfterEnd { start: 5, end: 3 });
        assert!(err.is_reportable());

        // Shape mismatches are not reportable.
        let shape_err = resolver.resolve("星期一3-4节", &reference()).unwrap_err();
        assert!(!shape_err.is_reportable());
    }

    #[test]
    fn test_range_check_precedes_table_lookup() {
        // 99 > 1, and neither is checked against the table before the
        // range validation fires.
        let resolver = SlotResolver::standard();
        assert_eq!(
            resolver.resolve("星期一 99-1节", &reference()).unwrap_err(),
            ResolveError::StartAfterEnd { start: 99, end: 1 }
        );
    }

    #[test]
    fn test_anchors_to_iso_week_of_reference() {
        let resolver = SlotResolver::standard();

        // Sunday 2025-09-21 is still in the ISO week of Monday 2025-09-15,
        // so resolving "Monday" lands in the past of the reference.
        let sunday = Utc.with_ymd_and_hms(2025, 9, 21, 8, 0, 0).unwrap();
        let range = resolver.resolve("星期一 1-1节", &sunday).unwrap();
        assert_eq!(range.start, Utc.with_ymd_and_hms(2025, 9, 15, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_iso_week_anchoring_across_year_boundary() {
        let resolver = SlotResolver::standard();

        // Wednesday 2025-12-31 belongs to ISO week 1 of 2026, whose Monday
        // is 2025-12-29.
        let new_years_eve = Utc.with_ymd_and_hms(2025, 12, 31, 10, 0, 0).unwrap();
        let range = resolver.resolve("星期一 1-2节", &new_years_eve).unwrap();
        assert_eq!(
            range.start,
            Utc.with_ymd_and_hms(2025, 12, 29, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_configurable_class_duration() {
        let resolver = SlotResolver::new(
            WeekdayTable::chinese(),
            SlotTimeTable::standard(),
            Duration::minutes(90),
        )
        .unwrap();

        let range = resolver.resolve("星期一 3-4节", &reference()).unwrap();
        assert_eq!(range.end, Utc.with_ymd_and_hms(2025, 9, 15, 12, 10, 0).unwrap());
    }

    #[test]
    fn test_rejects_non_positive_duration() {
        let result = SlotResolver::new(
            WeekdayTable::chinese(),
            SlotTimeTable::standard(),
            Duration::zero(),
        );
        assert_eq!(
            result.unwrap_err(),
            TableError::NonPositiveDuration { minutes: 0 }
        );
    }
}
