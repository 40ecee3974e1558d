//! Date, date-time and duration values as they appear in VEVENT properties.
//!
//! Producers disagree on how they write all-day and timed bookings, so the
//! resolver accepts every common form and always hands back a UTC instant.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::timezone::TzResolver;

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\+?P(?:(\d+)W)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
        .expect("duration pattern is valid")
});

/// Resolve a DTSTART/DTEND/DTSTAMP/LAST-MODIFIED value to a UTC instant.
///
/// Handles:
/// - Date only: `20250110` (midnight UTC)
/// - UTC: `20250110T140000Z`
/// - Zoned: `DTSTART;TZID=Europe/Paris:20250110T140000`
/// - Floating: `20250110T140000` (read as UTC)
/// - Anything chrono can read as RFC 3339 or `YYYY-MM-DD[THH:MM:SS]`
pub fn resolve_datetime(
    value: &str,
    params: &HashMap<String, String>,
    tz: &dyn TzResolver,
) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(date) = parse_basic_date(value) {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    let upper = value.to_ascii_uppercase();

    if let Some(naive) = upper.strip_suffix('Z').and_then(parse_basic_datetime) {
        return Some(naive.and_utc());
    }

    if let Some(naive) = parse_basic_datetime(&upper) {
        let zoned = params
            .get("TZID")
            .map(|zone| normalize_tzid(zone))
            .and_then(|zone| tz.to_utc(&zone, naive));
        return Some(zoned.unwrap_or_else(|| naive.and_utc()));
    }

    parse_generic(value)
}

/// Parse an ISO-8601 duration of the form `P[n]W[n]D[T[n]H[n]M[n]S]`.
///
/// Signed (`-P1D`) and fractional values are rejected.
pub fn parse_duration(value: &str) -> Option<TimeDelta> {
    let caps = DURATION_RE.captures(value.trim())?;
    let field = |i: usize| -> Option<i64> {
        caps.get(i).map_or(Some(0), |m| m.as_str().parse().ok())
    };

    let total = TimeDelta::try_weeks(field(1)?)?
        .checked_add(&TimeDelta::try_days(field(2)?)?)?
        .checked_add(&TimeDelta::try_hours(field(3)?)?)?
        .checked_add(&TimeDelta::try_minutes(field(4)?)?)?
        .checked_add(&TimeDelta::try_seconds(field(5)?)?)?;
    Some(total)
}

/// `TZID` values show up quoted, or with Windows-style separators.
fn normalize_tzid(raw: &str) -> String {
    raw.trim().trim_matches('"').replace('\\', "/")
}

fn parse_basic_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y%m%d").ok()
}

fn parse_basic_datetime(value: &str) -> Option<NaiveDateTime> {
    let bytes = value.as_bytes();
    if bytes.len() != 15 || bytes[8] != b'T' {
        return None;
    }
    if !bytes[..8].iter().chain(&bytes[9..]).all(u8::is_ascii_digit) {
        return None;
    }
    NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").ok()
}

fn parse_generic(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
