//! Wire record → `QueryRecord` conversion.
//!
//! Applied on every read path so callers never see a raw record. Missing
//! status defaults to `RecordStatus::DEFAULT`; a timestamp that cannot be
//! read is an error, not a silent fallback.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::error::ApiError;
use crate::types::{QueryRecord, RecordStatus, WireQueryRecord};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

pub fn normalize(wire: WireQueryRecord) -> Result<QueryRecord, ApiError> {
    let timestamp = parse_timestamp(wire.timestamp.as_ref())?;
    let status = normalize_status(wire.status.as_deref())?;
    Ok(QueryRecord {
        id: wire.id,
        query: wire.query,
        result: wire.result,
        timestamp,
        status,
    })
}

/// All-or-nothing: one record with an unreadable timestamp or a status
/// outside `A` / `I` (including lowercase codes) fails the whole batch with
/// that record's error, so a list is never silently shortened.
pub fn normalize_all(wires: Vec<WireQueryRecord>) -> Result<Vec<QueryRecord>, ApiError> {
    wires.into_iter().map(normalize).collect()
}

/// `None` and `""` both mean "not set".
pub fn normalize_status(raw: Option<&str>) -> Result<RecordStatus, ApiError> {
    match raw {
        None | Some("") => Ok(RecordStatus::DEFAULT),
        Some(code) => RecordStatus::from_code(code).ok_or_else(|| ApiError::InvalidStatus(code.to_string())),
    }
}

/// Epoch milliseconds (number or digit string), RFC 3339, or a naive ISO
/// date-time taken as UTC.
pub fn parse_timestamp(raw: Option<&Value>) -> Result<DateTime<Utc>, ApiError> {
    match raw {
        None | Some(Value::Null) => Err(ApiError::InvalidTimestamp("missing".to_string())),
        Some(Value::Number(n)) => {
            let millis = n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .ok_or_else(|| ApiError::InvalidTimestamp(n.to_string()))?;
            from_millis(millis, &n.to_string())
        }
        Some(Value::String(s)) => parse_timestamp_str(s),
        Some(other) => Err(ApiError::InvalidTimestamp(other.to_string())),
    }
}

fn parse_timestamp_str(s: &str) -> Result<DateTime<Utc>, ApiError> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(naive.and_utc());
        }
    }
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(millis) = s.parse::<i64>() {
            return from_millis(millis, s);
        }
    }
    Err(ApiError::InvalidTimestamp(s.to_string()))
}

fn from_millis(millis: i64, raw: &str) -> Result<DateTime<Utc>, ApiError> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| ApiError::InvalidTimestamp(raw.to_string()))
}
