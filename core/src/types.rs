//! Domain and wire types for the query record API.
//!
//! # Design
//! `WireQueryRecord` is what the backend sends: status may be missing and the
//! timestamp is either epoch milliseconds or a date string. `QueryRecord` is
//! the normalized shape callers see; the conversion lives in `normalize`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Opaque record identifier assigned by the backend.
///
/// Accepts both JSON strings and JSON integers on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => RecordId(s),
            Raw::Number(n) => RecordId(n.to_string()),
        })
    }
}

/// Soft-delete lifecycle flag. `Inactive` records are logically deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordStatus {
    #[serde(rename = "A")]
    Active,
    #[serde(rename = "I")]
    Inactive,
}

impl RecordStatus {
    /// Status assumed when a payload omits it.
    pub const DEFAULT: RecordStatus = RecordStatus::Active;

    pub fn code(&self) -> &'static str {
        match self {
            RecordStatus::Active => "A",
            RecordStatus::Inactive => "I",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "A" => Some(RecordStatus::Active),
            "I" => Some(RecordStatus::Inactive),
            _ => None,
        }
    }
}

impl Default for RecordStatus {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A normalized query record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRecord {
    pub id: RecordId,
    pub query: String,
    pub result: String,
    pub timestamp: DateTime<Utc>,
    pub status: RecordStatus,
}

impl QueryRecord {
    pub fn is_active(&self) -> bool {
        self.status == RecordStatus::Active
    }
}

/// A query record exactly as the backend serializes it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WireQueryRecord {
    pub id: RecordId,
    #[serde(default, deserialize_with = "opaque_text")]
    pub query: String,
    #[serde(default, deserialize_with = "opaque_text")]
    pub result: String,
    #[serde(default)]
    pub timestamp: Option<serde_json::Value>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Body of `PATCH /query-records/{id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: RecordStatus,
}

/// Accept any JSON value as text: `null` becomes empty, strings pass through,
/// everything else keeps its compact JSON form.
fn opaque_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}
