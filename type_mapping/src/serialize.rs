//! Serialization utilities
//!
//! This module renders records to plain JSON for event payloads.

use crate::types::{Record, SqlValue};
use serde_json::{Map, Number, Value};

/// Render a single value as JSON. Bytes become lowercase hex strings.
pub fn value_to_json(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Bool(b) => Value::Bool(*b),
        SqlValue::Int(i) => Value::Number((*i).into()),
        SqlValue::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        SqlValue::Text(s) => Value::String(s.clone()),
        SqlValue::Bytes(b) => Value::String(hex::encode(b)),
        SqlValue::Json(v) => v.clone(),
        SqlValue::Array(items) => Value::Array(items.iter().map(value_to_json).collect()),
    }
}

/// Render a record as a JSON object, preserving column order
pub fn record_to_json(record: &Record) -> Value {
    let mut map = Map::with_capacity(record.len());
    for (key, value) in record {
        map.insert(key.clone(), value_to_json(value));
    }
    Value::Object(map)
}
