//! Date/time utilities for spacehub.

use chrono::{DateTime, SecondsFormat, Utc};
use std::time::SystemTime;

/// Current time as an ISO-8601 string with millisecond precision.
///
/// Matches the format the submission records have always used
/// (e.g. "2024-01-15T10:30:00.123Z").
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Render a timestamp as a filename-safe suffix.
///
/// Colons and dots are not safe in filenames on all platforms, so they are
/// replaced with dashes: "2024-01-15T10:30:00.123Z" -> "2024-01-15T10-30-00-123Z".
pub fn filename_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

/// Extract the calendar-day key ("YYYY-MM-DD") from an ISO-8601 timestamp.
///
/// Returns `None` if the string is too short or not date-shaped.
pub fn day_key(timestamp: &str) -> Option<String> {
    let day = timestamp.get(..10)?;
    chrono::NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()?;
    Some(day.to_string())
}

/// Convert a filesystem timestamp to an ISO-8601 string.
pub fn system_time_to_iso(t: SystemTime) -> String {
    let dt: DateTime<Utc> = t.into();
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}
