//! CloudEvents HTTP protocol binding
//!
//! Supports binary mode (attributes in `ce-*` headers, body is the data) and
//! structured mode (`application/cloudevents+json` envelope).

use axum::body::Bytes;
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::Value;

use crate::error::EventError;

/// Media type that marks a structured-mode request
pub const STRUCTURED_CONTENT_TYPE: &str = "application/cloudevents+json";

/// Spec versions this receiver understands
const SUPPORTED_SPEC_VERSIONS: &[&str] = &["1.0", "0.3"];

/// Event data as it arrived on the wire
#[derive(Debug, Clone, PartialEq)]
pub enum EventData {
    /// No data
    Empty,
    /// Raw bytes (binary-mode body or decoded `data_base64`)
    Bytes(Bytes),
    /// Already-decoded JSON (structured-mode `data`)
    Json(Value),
}

/// The attributes this receiver uses plus the event data
#[derive(Debug, Clone, PartialEq)]
pub struct CloudEvent {
    pub id: String,
    pub source: String,
    pub event_type: String,
    pub spec_version: String,
    pub data: EventData,
}

#[derive(Deserialize)]
struct Envelope {
    id: Option<String>,
    source: Option<String>,
    #[serde(rename = "type")]
    event_type: Option<String>,
    specversion: Option<String>,
    data: Option<Value>,
    data_base64: Option<String>,
}

impl CloudEvent {
    /// Decode a CloudEvent from an HTTP request's headers and body
    pub fn from_http(headers: &HeaderMap, body: Bytes) -> Result<Self, EventError> {
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        let event = if content_type
            .to_ascii_lowercase()
            .starts_with(STRUCTURED_CONTENT_TYPE)
        {
            Self::from_structured(&body)?
        } else {
            Self::from_binary(headers, body)?
        };

        if !SUPPORTED_SPEC_VERSIONS.contains(&event.spec_version.as_str()) {
            return Err(EventError::UnsupportedSpecVersion(event.spec_version));
        }
        Ok(event)
    }

    fn from_binary(headers: &HeaderMap, body: Bytes) -> Result<Self, EventError> {
        let attr = |name: &'static str| {
            headers
                .get(format!("ce-{name}"))
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or(EventError::MissingAttribute(name))
        };

        Ok(Self {
            id: attr("id")?,
            source: attr("source")?,
            event_type: attr("type")?,
            spec_version: attr("specversion")?,
            data: if body.is_empty() {
                EventData::Empty
            } else {
                EventData::Bytes(body)
            },
        })
    }

    fn from_structured(body: &[u8]) -> Result<Self, EventError> {
        let envelope: Envelope =
            serde_json::from_slice(body).map_err(EventError::MalformedEnvelope)?;

        let required = |value: Option<String>, name: &'static str| {
            value
                .filter(|v| !v.is_empty())
                .ok_or(EventError::MissingAttribute(name))
        };

        let data = match (envelope.data, envelope.data_base64) {
            (Some(Value::Null), None) | (None, None) => EventData::Empty,
            (Some(value), _) => EventData::Json(value),
            (None, Some(encoded)) => EventData::Bytes(Bytes::from(
                base64::engine::general_purpose::STANDARD.decode(encoded)?,
            )),
        };

        Ok(Self {
            id: required(envelope.id, "id")?,
            source: required(envelope.source, "source")?,
            event_type: required(envelope.event_type, "type")?,
            spec_version: required(envelope.specversion, "specversion")?,
            data,
        })
    }
}
