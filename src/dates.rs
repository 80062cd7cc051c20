//! Calendar-day helpers.
//!
//! Records carry dates as `YYYY-MM-DD` strings in local time. Strings are
//! compared directly for ordering and window filters; they are parsed into
//! [`NaiveDate`] only when a day difference or a weekday is needed.

use chrono::{DateTime, Datelike, Local, NaiveDate, SecondsFormat, Utc};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Today's calendar day on the local clock.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a `YYYY-MM-DD` string. Malformed input yields `None`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

/// Whole days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// The day `days` before `date`, saturating at the calendar minimum.
pub fn days_before(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_sub_days(chrono::Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN)
}

/// Weekday index with 0=Sunday..6=Saturday (the habit `customDays` convention).
pub fn sunday_based_weekday(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// Weekday index with 0=Monday..6=Sunday (calendar grid columns).
pub fn monday_based_weekday(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_monday()
}

/// Current instant as an RFC 3339 UTC timestamp with millisecond precision.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Local calendar day of an RFC 3339 timestamp such as
/// `2026-03-01T08:00:00.000Z`. A bare `YYYY-MM-DD` prefix is taken as is.
pub fn timestamp_date(timestamp: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|instant| instant.with_timezone(&Local).date_naive())
        .ok()
        .or_else(|| timestamp.get(..10).and_then(parse_date))
}
