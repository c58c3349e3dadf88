//! Property value codec
//!
//! Translates between the generic node-property storage shape and
//! [`StructuredValue`].
//!
//! # Storage shape
//! - [`Multiplicity::Single`]: one JSON string
//! - [`Multiplicity::Multiple`]: a one-element array holding that string
//!
//! # Fallback rule
//! Decoding is total. Absent data, wrong multiplicity, non-string entries,
//! malformed JSON or a non-object payload all decode to the empty value. The
//! field must always render, so corruption is logged at `debug` and never
//! surfaced.

use crate::types::{MediaReference, Multiplicity, StructuredValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Codec behavior switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    /// Also write `lastCropVersion` to storage. Decoding ignores the key
    /// either way; the token is recomputed every session.
    pub persist_crop_version: bool,
}

/// Encoded property value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageShape {
    /// Single-valued property
    Single(String),
    /// Multi-valued property (always one element when produced by [`encode`])
    Multiple(Vec<String>),
}

impl StorageShape {
    /// JSON payload carried by this shape
    #[must_use]
    pub fn payload(&self) -> Option<&str> {
        match self {
            Self::Single(json) => Some(json.as_str()),
            Self::Multiple(items) => items.first().map(String::as_str),
        }
    }

    /// Raw node value
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Single(json) => Value::String(json),
            Self::Multiple(items) => Value::Array(items.into_iter().map(Value::String).collect()),
        }
    }
}

impl From<StorageShape> for Value {
    fn from(shape: StorageShape) -> Self {
        shape.into_value()
    }
}

/// Persisted subset of [`StructuredValue`]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistedValue<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    media: Option<&'a MediaReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    preview_crop_key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_crop_version: Option<&'a str>,
}

/// Codec bound to one property's multiplicity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropertyValueCodec {
    multiplicity: Multiplicity,
    options: CodecOptions,
}

impl PropertyValueCodec {
    /// Create codec for a property
    #[inline]
    #[must_use]
    pub fn new(multiplicity: Multiplicity) -> Self {
        Self {
            multiplicity,
            options: CodecOptions::default(),
        }
    }

    /// With options
    #[inline]
    #[must_use]
    pub fn with_options(mut self, options: CodecOptions) -> Self {
        self.options = options;
        self
    }

    /// Property multiplicity
    #[inline]
    #[must_use]
    pub fn multiplicity(&self) -> Multiplicity {
        self.multiplicity
    }

    /// Codec options
    #[inline]
    #[must_use]
    pub fn options(&self) -> CodecOptions {
        self.options
    }

    /// Decode a raw node value; `None` means the property is absent
    #[must_use]
    pub fn decode(&self, raw: Option<&Value>) -> StructuredValue {
        let Some(raw) = raw else {
            return StructuredValue::default();
        };

        match self.payload(raw) {
            Some(payload) => parse_payload(payload),
            None => StructuredValue::default(),
        }
    }

    /// Encode a value; `None` encodes as the empty value
    #[must_use]
    pub fn encode(&self, value: Option<&StructuredValue>) -> StorageShape {
        let empty = StructuredValue::default();
        let value = value.unwrap_or(&empty);

        let persisted = PersistedValue {
            media: value.media.as_ref(),
            preview_crop_key: value.preview_crop_key.as_deref(),
            last_crop_version: if self.options.persist_crop_version {
                value.last_crop_version.as_deref()
            } else {
                None
            },
        };

        let json = serde_json::to_string(&persisted).unwrap_or_else(|e| {
            tracing::warn!("image crop value not serializable, storing empty value: {}", e);
            "{}".to_string()
        });

        match self.multiplicity {
            Multiplicity::Single => StorageShape::Single(json),
            Multiplicity::Multiple => StorageShape::Multiple(vec![json]),
        }
    }

    /// Pick the JSON string out of the raw shape
    fn payload<'a>(&self, raw: &'a Value) -> Option<&'a str> {
        match (self.multiplicity, raw) {
            (Multiplicity::Multiple, Value::Array(items)) => match items.first() {
                Some(Value::String(json)) => Some(json.as_str()),
                Some(other) => {
                    tracing::debug!("multi-valued entry is not a string: {}", other);
                    None
                }
                None => {
                    tracing::debug!("multi-valued property is empty");
                    None
                }
            },
            (Multiplicity::Multiple, other) => {
                tracing::debug!("expected array for multi-valued property, got {}", kind(other));
                None
            }
            (Multiplicity::Single, Value::String(json)) => Some(json.as_str()),
            (Multiplicity::Single, other) => {
                tracing::debug!("expected string for single-valued property, got {}", kind(other));
                None
            }
        }
    }
}

/// Decode with default options
#[inline]
#[must_use]
pub fn decode(raw: Option<&Value>, multiplicity: Multiplicity) -> StructuredValue {
    PropertyValueCodec::new(multiplicity).decode(raw)
}

/// Encode with default options
#[inline]
#[must_use]
pub fn encode(value: Option<&StructuredValue>, multiplicity: Multiplicity) -> StorageShape {
    PropertyValueCodec::new(multiplicity).encode(value)
}

fn parse_payload(payload: &str) -> StructuredValue {
    match serde_json::from_str::<Value>(payload) {
        Ok(Value::Object(object)) => coerce(&object),
        Ok(other) => {
            tracing::debug!("stored payload is not an object: {}", kind(&other));
            StructuredValue::default()
        }
        Err(e) => {
            tracing::debug!("stored payload is not JSON: {}", e);
            StructuredValue::default()
        }
    }
}

/// Key-by-key coercion: a bad key defaults, it never poisons the others
fn coerce(object: &Map<String, Value>) -> StructuredValue {
    let media = match object.get("media") {
        None | Some(Value::Null) => None,
        Some(raw) => match MediaReference::deserialize(raw) {
            Ok(media) => Some(media),
            Err(e) => {
                tracing::debug!("stored media is not a media reference: {}", e);
                None
            }
        },
    };

    let preview_crop_key = object
        .get("previewCropKey")
        .and_then(Value::as_str)
        .map(str::to_string);

    StructuredValue {
        media,
        preview_crop_key,
        last_crop_version: None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
