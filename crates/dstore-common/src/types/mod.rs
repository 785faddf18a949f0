//! Common types used across dstore
//!
//! A datastore holds [`Record`]s: JSON objects whose fields are arbitrary JSON
//! values. One field per datastore is the primary key; its value identifies
//! the record and is compared through [`PrimaryKeyValue`].

use crate::error::{CommonError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single datastore item
pub type Record = Map<String, Value>;

/// The value held in a record's primary-key field
///
/// Stored as the compact JSON encoding of the value so that it can be hashed
/// and compared regardless of the JSON type (`"42"` and `42` are different
/// keys). Numbers are compared by numeric value, so `1` and `1.0` are the
/// same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrimaryKeyValue(String);

impl PrimaryKeyValue {
    /// Build a key from a JSON value
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(number) => match number.as_f64() {
                Some(float) => Self(Value::from(float).to_string()),
                None => Self(value.to_string()),
            },
            other => Self(other.to_string()),
        }
    }

    /// The compact JSON encoding of the key
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PrimaryKeyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Look up the primary-key value of a record
///
/// Returns `None` when the field is absent.
pub fn primary_key_of(record: &Record, field: &str) -> Option<PrimaryKeyValue> {
    record.get(field).map(PrimaryKeyValue::from_value)
}

/// Parse one line of text as a record
///
/// Anything that is not a JSON object is rejected.
pub fn parse_record(line: &str) -> Result<Record> {
    match serde_json::from_str::<Value>(line)? {
        Value::Object(map) => Ok(map),
        other => Err(CommonError::NotAnObject(json_type_name(&other).to_string())),
    }
}

/// Encode a record as a single line of compact JSON (no trailing newline)
pub fn record_to_line(record: &Record) -> Result<String> {
    Ok(serde_json::to_string(record)?)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
