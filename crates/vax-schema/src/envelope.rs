use std::collections::BTreeMap;

use chrono::Utc;
use vax_canonical::{encode, CanonicalValue, EncodingError, Number};

use crate::validate::ValidatedFieldSet;

/// A decoded action envelope.
///
/// The wire form is a canonical three-key object:
/// `{"action_type":...,"sdto":{...},"timestamp":...}`. Envelope bytes are
/// what gets hashed into the chain, so construction always goes through the
/// canonical encoder and parsing only accepts byte-exact canonical input.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionEnvelope {
    /// Provider-scoped action type identifier.
    pub action_type: String,
    /// Producer-asserted time, unix milliseconds.
    pub timestamp: i64,
    /// The validated field map.
    pub sdto: ValidatedFieldSet,
}

impl ActionEnvelope {
    /// Re-encodes the envelope into its canonical wire bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        build_envelope_at(&self.action_type, self.timestamp, &self.sdto)
    }
}

/// Builds canonical envelope bytes with the current wall-clock timestamp.
pub fn build_envelope(action_type: &str, fields: &ValidatedFieldSet) -> Vec<u8> {
    build_envelope_at(action_type, Utc::now().timestamp_millis(), fields)
}

/// Builds canonical envelope bytes at an explicit unix-millisecond timestamp.
///
/// Infallible: the inputs are already canonical values and the encoder is
/// total over them.
pub fn build_envelope_at(action_type: &str, timestamp: i64, fields: &ValidatedFieldSet) -> Vec<u8> {
    let mut envelope = BTreeMap::new();
    envelope.insert(
        "action_type".to_string(),
        CanonicalValue::String(action_type.to_string()),
    );
    envelope.insert(
        "timestamp".to_string(),
        CanonicalValue::Number(Number::from_i64(timestamp)),
    );
    envelope.insert("sdto".to_string(), CanonicalValue::Object(fields.clone()));
    encode(&CanonicalValue::Object(envelope))
}

/// Parses envelope bytes back into an [`ActionEnvelope`].
///
/// Strict by design: the input must be byte-exact canonical form and carry
/// exactly the three envelope keys. Anything else, including an envelope with
/// extra keys bolted on, is rejected.
pub fn parse_envelope(bytes: &[u8]) -> Result<ActionEnvelope, EncodingError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|err| EncodingError::ParseError(format!("invalid UTF-8: {err}")))?;
    let parsed: serde_json::Value = serde_json::from_str(text)
        .map_err(|err| EncodingError::ParseError(err.to_string()))?;
    let value = CanonicalValue::from_json(&parsed).map_err(|err| match err {
        EncodingError::InvalidNumber(text) => {
            EncodingError::ParseError(format!("disallowed number literal: {text}"))
        }
        other => other,
    })?;
    if encode(&value) != bytes {
        return Err(EncodingError::ParseError(
            "envelope bytes are not in canonical form".to_string(),
        ));
    }

    let object = value
        .as_object()
        .ok_or_else(|| EncodingError::ParseError("envelope must be an object".to_string()))?;
    if object.len() != 3 {
        return Err(EncodingError::ParseError(format!(
            "envelope must have exactly 3 keys, found {}",
            object.len()
        )));
    }

    let action_type = object
        .get("action_type")
        .and_then(CanonicalValue::as_str)
        .ok_or_else(|| {
            EncodingError::ParseError("envelope is missing a string action_type".to_string())
        })?
        .to_string();
    let timestamp = object
        .get("timestamp")
        .and_then(CanonicalValue::as_number)
        .filter(|n| n.is_integer())
        .and_then(|n| n.as_str().parse::<i64>().ok())
        .ok_or_else(|| {
            EncodingError::ParseError("envelope is missing an integer timestamp".to_string())
        })?;
    let sdto = object
        .get("sdto")
        .and_then(CanonicalValue::as_object)
        .ok_or_else(|| EncodingError::ParseError("envelope is missing an sdto object".to_string()))?
        .clone();

    Ok(ActionEnvelope {
        action_type,
        timestamp,
        sdto,
    })
}
