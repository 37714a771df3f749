//! Post date parsing
//!
//! Dates are normalized to epoch milliseconds. Day-first `d/m/y` is tried
//! before any generic format, so `12/05/2021` is 12 May 2021.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};

/// Date-only formats accepted by the generic fallback, interpreted at local midnight
const DATE_FORMATS: &[&str] = &[
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
];

/// Date-time formats without an offset, interpreted in local time
const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Parses a post date into epoch milliseconds
///
/// Returns `None` when no supported format matches.
///
/// # Examples
///
/// ```
/// use sitemap_harvest::extract::parse_date;
///
/// assert_eq!(parse_date("12/05/2021"), parse_date("May 12, 2021"));
/// assert_eq!(parse_date("yesterday-ish"), None);
/// ```
pub fn parse_date(input: &str) -> Option<i64> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }
    parse_day_first(s).or_else(|| parse_generic(s))
}

fn parse_day_first(s: &str) -> Option<i64> {
    let mut parts = s.split('/').map(str::trim);
    let day: u32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let year: i32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    local_midnight_millis(NaiveDate::from_ymd_opt(year, month, day)?)
}

fn parse_generic(s: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.timestamp_millis());
    }

    for format in DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return local_millis(&naive);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return local_midnight_millis(date);
        }
    }

    None
}

fn local_midnight_millis(date: NaiveDate) -> Option<i64> {
    local_millis(&date.and_hms_opt(0, 0, 0)?)
}

// DST gaps have no local midnight; earliest() picks the first valid instant on folds
fn local_millis(naive: &NaiveDateTime) -> Option<i64> {
    Local
        .from_local_datetime(naive)
        .earliest()
        .map(|dt| dt.timestamp_millis())
}
