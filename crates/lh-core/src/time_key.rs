//! Day and month key arithmetic.
//!
//! Day keys are `YYYY-MM-DD`, month keys are `YYYY-MM`. Both sort lexically in
//! chronological order, which the index and range resolver rely on.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

use crate::types::Granularity;

/// Spans of up to this many whole days are bucketed by day, longer spans by month.
pub const MAX_DAY_GRANULARITY_SPAN: i64 = 92;

/// Parses a `YYYY-MM-DD` key (anything after the tenth byte is ignored).
pub fn parse_day(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.get(..10)?, "%Y-%m-%d").ok()
}

/// Formats a date as a day key.
pub fn format_day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Formats the month containing `date` as a month key.
pub fn format_month(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Parses a `YYYY-MM` key into the first day of that month.
pub fn parse_month(key: &str) -> Option<NaiveDate> {
    if key.len() != 7 || key.as_bytes()[4] != b'-' {
        return None;
    }
    let year: i32 = key[..4].parse().ok()?;
    let month: u32 = key[5..].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Month key of a day key.
pub fn month_of(day: &str) -> &str {
    day.get(..7).unwrap_or(day)
}

/// Shifts a date by whole calendar months.
///
/// The day of month is clamped when the target month is shorter, so one month
/// before March 31 is the last day of February.
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

/// Shifts a date by whole calendar years, clamping Feb 29 to Feb 28.
pub fn add_years(date: NaiveDate, years: i32) -> NaiveDate {
    add_months(date, years.saturating_mul(12))
}

/// Whole days from `from` to `to` (negative when inverted).
pub fn diff_days(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Clamps a day key lexically into `[min, max]`.
pub fn clamp_day<'a>(day: &'a str, min: &'a str, max: &'a str) -> &'a str {
    if day < min {
        min
    } else if day > max {
        max
    } else {
        day
    }
}

/// Picks day granularity for spans up to [`MAX_DAY_GRANULARITY_SPAN`] days.
pub fn choose_granularity(from: NaiveDate, to: NaiveDate) -> Granularity {
    if diff_days(from, to) <= MAX_DAY_GRANULARITY_SPAN {
        Granularity::Day
    } else {
        Granularity::Month
    }
}

/// Every day key from `from` to `to` inclusive, ascending.
pub fn day_keys(from: NaiveDate, to: NaiveDate) -> Vec<String> {
    from.iter_days()
        .take_while(|d| *d <= to)
        .map(format_day)
        .collect()
}

/// Every month key from the month of `from` to the month of `to` inclusive.
pub fn month_keys(from: NaiveDate, to: NaiveDate) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = from.with_day(1).unwrap_or(from);
    while cursor <= to {
        out.push(format_month(cursor));
        let Some(next) = cursor.checked_add_months(Months::new(1)) else {
            break;
        };
        cursor = next;
    }
    out
}

/// Ordered bucket keys covering `[from, to]` at the given granularity.
pub fn build_keys(granularity: Granularity, from: NaiveDate, to: NaiveDate) -> Vec<String> {
    match granularity {
        Granularity::Day => day_keys(from, to),
        Granularity::Month => month_keys(from, to),
    }
}

/// First day of the week containing `date`.
pub fn start_of_week(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let offset = (7 + date.weekday().num_days_from_monday()
        - week_start.num_days_from_monday())
        % 7;
    date - Days::new(u64::from(offset))
}

/// Last day of the week containing `date`.
pub fn end_of_week(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    start_of_week(date, week_start) + Days::new(6)
}

/// Last day of the month containing `date`.
pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    let first = date.with_day(1).unwrap_or(date);
    add_months(first, 1).pred_opt().unwrap_or(date)
}

/// Parses an English weekday name (`monday`, `mon`, ...).
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    name.parse::<Weekday>().ok()
}
