//! Calendar grid generation for week, month, and year views.
//!
//! All functions are pure and total for valid calendar dates. The week
//! convention is ISO (Monday first), the same convention the slot resolver
//! uses to anchor time strings, so week boundaries agree everywhere.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

/// The Monday of the ISO week containing `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as u64;
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// The 7 dates of the ISO week containing `date`, Monday first.
pub fn week_dates(date: NaiveDate) -> Vec<NaiveDate> {
    start_of_week(date).iter_days().take(7).collect()
}

/// The date sequence for a month grid: the month's own days, left-padded
/// with the previous month's tail so the grid starts on `first_weekday`,
/// right-padded with the next month's head to a multiple of 7.
pub fn month_grid(date: NaiveDate, first_weekday: Weekday) -> Vec<NaiveDate> {
    let first_of_month = first_of_month(date);

    let prefix = (first_of_month.weekday().num_days_from_monday() + 7
        - first_weekday.num_days_from_monday())
        % 7;

    let grid_start = first_of_month
        .checked_sub_days(Days::new(prefix as u64))
        .unwrap_or(first_of_month);

    let month_len = days_in_month(date);
    let padded = prefix as u32 + month_len;
    let total = padded + (7 - padded % 7) % 7;

    grid_start.iter_days().take(total as usize).collect()
}

/// The 12 first-of-month dates of the year containing `date`.
pub fn months_in_year(date: NaiveDate) -> Vec<NaiveDate> {
    let january = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
    (0..12)
        .filter_map(|i| january.checked_add_months(Months::new(i)))
        .collect()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

fn days_in_month(date: NaiveDate) -> u32 {
    let first = first_of_month(date);
    let next = first
        .checked_add_months(Months::new(1))
        .unwrap_or(first);
    next.signed_duration_since(first).num_days() as u32
}
