//! ISO-8601 timestamp helpers.
//!
//! Timestamps are stored as strings so records written by other tools keep
//! their exact textual form; parsing happens only for comparison and
//! validation.

use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};

/// Current UTC time as RFC 3339 with microsecond precision.
pub fn now_iso() -> String {
    format_iso(Utc::now())
}

pub fn format_iso(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current UTC calendar date.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Parses an RFC 3339 timestamp into UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn is_valid_due(value: &str) -> bool {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").is_ok() || parse_timestamp(trimmed).is_some()
}

/// Returns a timestamp strictly later than `previous`.
///
/// Mutations must advance `updated_at` even when two writes land inside the
/// same clock tick.
pub fn advance_from(previous: &str) -> String {
    let now = Utc::now();
    match parse_timestamp(previous) {
        Some(prev) if now <= prev => format_iso(prev + Duration::microseconds(1)),
        _ => format_iso(now),
    }
}
