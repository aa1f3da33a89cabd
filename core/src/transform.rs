//! Value transforms used by the endpoint allow-lists.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Dates become canonical RFC 3339 UTC strings; falsy or invalid input
/// becomes `null`.
pub fn date_or_null(value: Value) -> Value {
    match parse_date(&value) {
        Some(date) => Value::String(date.to_rfc3339_opts(SecondsFormat::Millis, true)),
        None => Value::Null,
    }
}

/// Read an ISO 8601 timestamp, a plain `YYYY-MM-DD` date, or epoch millis.
///
/// Timestamps without an offset are taken as UTC. Offsets may be written
/// with or without a colon (`+02:00`, `+0200`).
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    if is_falsy(value) {
        return None;
    }
    match value {
        Value::String(s) => parse_date_str(s.trim()),
        Value::Number(n) => match n.as_i64() {
            Some(millis) => DateTime::from_timestamp_millis(millis),
            None => DateTime::from_timestamp_millis(n.as_f64()?.round() as i64),
        },
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(s) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
}

/// Keep the part after the last `.`, e.g. `user.bpmadmin` becomes `bpmadmin`.
pub fn after_last_dot(value: Value) -> Value {
    match value {
        Value::String(s) => {
            let tail = s.rsplit_once('.').map(|(_, tail)| tail.to_string());
            Value::String(tail.unwrap_or(s))
        }
        other => other,
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}
