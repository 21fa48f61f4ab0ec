//! Timestamp parsing and human-readable time formatting.
//!
//! Hosts are loose about timestamp shapes, so parsing accepts RFC 3339,
//! naive date-times (taken as UTC), bare dates and epoch milliseconds.
//! All display formatting happens in the viewer's time zone, which is the
//! zone carried by the `now` argument.

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc,
};
use serde_json::Value;
use std::fmt::Display;

use crate::error::{BriefingError, Result};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Absolute timestamp shown as supplementary detail, 24-hour clock.
pub const ABSOLUTE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Due time of day, 12-hour clock with meridiem.
pub const DUE_TIME_FORMAT: &str = "%-I:%M %p";

/// Parse a timestamp string in any of the accepted wire shapes.
///
/// # Errors
/// Returns [`BriefingError::InvalidTimestamp`] when no shape matches.
pub fn parse_timestamp_str(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    Err(BriefingError::InvalidTimestamp(raw.to_string()))
}

/// Lenient variant used by payload decoding: strings or epoch millis,
/// anything else is treated as absent.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp_str(s).ok(),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

/// Parse the viewer's clock. The offset of the value becomes the display zone.
///
/// # Errors
/// Returns [`BriefingError::InvalidTimestamp`] unless `raw` is RFC 3339.
pub fn parse_clock(raw: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map_err(|_| BriefingError::InvalidTimestamp(raw.to_string()))
}

/// "3 hours ago" / "in 2 days", relative to `now`.
pub fn from_now<Tz: TimeZone>(then: &DateTime<Utc>, now: &DateTime<Tz>) -> String {
    let elapsed = now.with_timezone(&Utc).signed_duration_since(*then);
    let secs = elapsed.num_seconds();
    let phrase = humanize_seconds(secs.unsigned_abs());
    if secs >= 0 {
        format!("{phrase} ago")
    } else {
        format!("in {phrase}")
    }
}

fn rounded(secs: u64, unit: f64) -> u64 {
    (secs as f64 / unit).round() as u64
}

fn humanize_seconds(secs: u64) -> String {
    let minutes = rounded(secs, 60.0);
    let hours = rounded(secs, 3_600.0);
    let days = rounded(secs, 86_400.0);
    let months = rounded(secs, 86_400.0 * 30.4375);
    let years = rounded(secs, 86_400.0 * 365.25);

    if secs <= 44 {
        "a few seconds".to_string()
    } else if secs <= 89 {
        "a minute".to_string()
    } else if minutes <= 44 {
        format!("{minutes} minutes")
    } else if minutes <= 89 {
        "an hour".to_string()
    } else if hours <= 21 {
        format!("{hours} hours")
    } else if hours <= 35 {
        "a day".to_string()
    } else if days <= 25 {
        format!("{days} days")
    } else if days <= 45 {
        "a month".to_string()
    } else if months <= 10 {
        format!("{months} months")
    } else if months <= 17 {
        "a year".to_string()
    } else {
        format!("{} years", years.max(2))
    }
}

/// `YYYY-MM-DD HH:mm:ss` in the zone of `now`.
pub fn absolute<Tz>(at: &DateTime<Utc>, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.with_timezone(&now.timezone())
        .format(ABSOLUTE_FORMAT)
        .to_string()
}

/// `h:mm AM` in the zone of `now`.
pub fn due_time<Tz>(at: &DateTime<Utc>, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.with_timezone(&now.timezone())
        .format(DUE_TIME_FORMAT)
        .to_string()
}
