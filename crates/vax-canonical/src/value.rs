use std::collections::BTreeMap;

use serde::Serialize;

use crate::encoder::EncodingError;
use crate::number::Number;

/// A structured value accepted by the canonical encoder.
///
/// This is a closed tagged union: the encoder dispatches exhaustively over
/// these six variants, so there is no open "dynamic" escape hatch that could
/// smuggle in an unencodable value. Objects are `BTreeMap`s and therefore
/// structurally duplicate-free; duplicate-key detection belongs to the JSON
/// parsing layer.
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalValue {
    /// JSON `null`.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// Normalized decimal number.
    Number(Number),
    /// UTF-8 string.
    String(String),
    /// Ordered sequence; element order is preserved exactly.
    Array(Vec<CanonicalValue>),
    /// Key/value map; members are emitted in canonical key order.
    Object(BTreeMap<String, CanonicalValue>),
}

impl CanonicalValue {
    /// Builds a number value from a binary float.
    ///
    /// Fails with [`EncodingError::InvalidNumber`] on NaN, infinities, or
    /// magnitudes that require scientific notation.
    pub fn number(value: f64) -> Result<Self, EncodingError> {
        Ok(CanonicalValue::Number(Number::from_f64(value)?))
    }

    /// Converts a parsed JSON value into a canonical value.
    ///
    /// Number literals are re-validated against the canonical decimal rules,
    /// so scientific notation survives a lenient JSON parse only up to this
    /// point.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, EncodingError> {
        match value {
            serde_json::Value::Null => Ok(CanonicalValue::Null),
            serde_json::Value::Bool(b) => Ok(CanonicalValue::Bool(*b)),
            serde_json::Value::Number(n) => {
                // With arbitrary_precision the Display form is the source
                // literal, not a float round-trip.
                Ok(CanonicalValue::Number(Number::parse(&n.to_string())?))
            }
            serde_json::Value::String(s) => Ok(CanonicalValue::String(s.clone())),
            serde_json::Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(Self::from_json(item)?);
                }
                Ok(CanonicalValue::Array(out))
            }
            serde_json::Value::Object(map) => {
                let mut out = BTreeMap::new();
                for (key, child) in map {
                    out.insert(key.clone(), Self::from_json(child)?);
                }
                Ok(CanonicalValue::Object(out))
            }
        }
    }

    /// Converts any serializable value into a canonical value.
    ///
    /// Serializes directly into this type, so every float passes through the
    /// canonical number rules: NaN and infinities fail with
    /// [`EncodingError::InvalidNumber`] rather than degrading to `null`.
    /// Fails with [`EncodingError::UnsupportedType`] when the value has no
    /// object representation (e.g. a map with non-string keys).
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, EncodingError> {
        value.serialize(crate::ser::ValueSerializer)
    }

    /// Returns the string content if this is a `String` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CanonicalValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number if this is a `Number` value.
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            CanonicalValue::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the member map if this is an `Object` value.
    pub fn as_object(&self) -> Option<&BTreeMap<String, CanonicalValue>> {
        match self {
            CanonicalValue::Object(map) => Some(map),
            _ => None,
        }
    }
}

impl From<bool> for CanonicalValue {
    fn from(value: bool) -> Self {
        CanonicalValue::Bool(value)
    }
}

impl From<&str> for CanonicalValue {
    fn from(value: &str) -> Self {
        CanonicalValue::String(value.to_string())
    }
}

impl From<String> for CanonicalValue {
    fn from(value: String) -> Self {
        CanonicalValue::String(value)
    }
}

impl From<Number> for CanonicalValue {
    fn from(value: Number) -> Self {
        CanonicalValue::Number(value)
    }
}

impl From<i32> for CanonicalValue {
    fn from(value: i32) -> Self {
        CanonicalValue::Number(Number::from_i64(value.into()))
    }
}

impl From<i64> for CanonicalValue {
    fn from(value: i64) -> Self {
        CanonicalValue::Number(Number::from_i64(value))
    }
}

impl From<u64> for CanonicalValue {
    fn from(value: u64) -> Self {
        CanonicalValue::Number(Number::from_u64(value))
    }
}

impl TryFrom<f64> for CanonicalValue {
    type Error = EncodingError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        CanonicalValue::number(value)
    }
}

impl From<Vec<CanonicalValue>> for CanonicalValue {
    fn from(value: Vec<CanonicalValue>) -> Self {
        CanonicalValue::Array(value)
    }
}

impl From<BTreeMap<String, CanonicalValue>> for CanonicalValue {
    fn from(value: BTreeMap<String, CanonicalValue>) -> Self {
        CanonicalValue::Object(value)
    }
}
