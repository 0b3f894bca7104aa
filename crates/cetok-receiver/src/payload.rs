//! Event data to job payload
//!
//! Two stages, kept separate so each can be tested on its own:
//! `decode_data` turns the wire data into an untyped JSON object, then
//! `coerce_payload` renders every value as a string.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::cloudevent::EventData;
use crate::error::EventError;

/// Decode event data into a JSON object. Missing data decodes to an empty object.
pub fn decode_data(data: &EventData) -> Result<Map<String, Value>, EventError> {
    let value = match data {
        EventData::Empty => return Ok(Map::new()),
        EventData::Bytes(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => {
            return Ok(Map::new())
        }
        EventData::Bytes(bytes) => serde_json::from_slice(bytes).map_err(EventError::InvalidJson)?,
        EventData::Json(value) => value.clone(),
    };

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(EventError::NotAnObject(json_kind(&other))),
    }
}

/// Render every value as a string: strings verbatim, `null` as empty,
/// numbers and booleans in their usual form, arrays and objects as compact JSON.
pub fn coerce_payload(map: Map<String, Value>) -> BTreeMap<String, String> {
    map.into_iter()
        .map(|(key, value)| (key, coerce_value(value)))
        .collect()
}

fn coerce_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
