use crate::value::CanonicalValue;

/// Error returned when a value or source text cannot be canonicalized.
#[derive(thiserror::Error, Debug)]
pub enum EncodingError {
    /// The value has no canonical representation.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),
    /// NaN, infinity, or a number requiring scientific notation.
    #[error("invalid number: {0}")]
    InvalidNumber(String),
    /// A string that cannot be emitted (reserved; all Rust `str` input is
    /// valid UTF-8, so this only surfaces through future extension points).
    #[error("invalid string: {0}")]
    InvalidString(String),
    /// Malformed source text, or text containing a disallowed literal such
    /// as scientific notation or a leading zero.
    #[error("parse error: {0}")]
    ParseError(String),
    /// A duplicate object member was detected.
    /// Reserved for the JSON parsing layer: `CanonicalValue::Object` is a
    /// `BTreeMap` and cannot hold duplicates by construction.
    #[error("duplicate key detected: {0}")]
    #[allow(dead_code)]
    DuplicateKey(String),
}

/// Encodes a canonical value into its deterministic byte sequence.
///
/// Infallible: every invalid number is rejected when the [`CanonicalValue`]
/// is constructed, and objects cannot hold duplicate keys.
pub fn encode(value: &CanonicalValue) -> Vec<u8> {
    let mut out = Vec::new();
    write_value(&mut out, value);
    out
}

/// Parses JSON source text and re-encodes it canonically.
///
/// Rejects malformed JSON, invalid UTF-8, unpaired surrogate escapes, and
/// number literals the canonical profile disallows (scientific notation,
/// leading zeros). All failures surface as [`EncodingError::ParseError`].
pub fn encode_text(input: &[u8]) -> Result<Vec<u8>, EncodingError> {
    let text = std::str::from_utf8(input)
        .map_err(|e| EncodingError::ParseError(format!("invalid UTF-8: {e}")))?;
    let parsed: serde_json::Value =
        serde_json::from_str(text).map_err(|e| EncodingError::ParseError(e.to_string()))?;
    let value = CanonicalValue::from_json(&parsed).map_err(|e| match e {
        EncodingError::InvalidNumber(literal) => {
            EncodingError::ParseError(format!("disallowed number literal: {literal}"))
        }
        other => other,
    })?;
    Ok(encode(&value))
}

/// Returns true if the input already equals its own canonical re-encoding.
pub fn is_canonical(input: &[u8]) -> bool {
    match encode_text(input) {
        Ok(canonical) => canonical == input,
        Err(_) => false,
    }
}

fn write_value(out: &mut Vec<u8>, value: &CanonicalValue) {
    match value {
        CanonicalValue::Null => out.extend_from_slice(b"null"),
        CanonicalValue::Bool(true) => out.extend_from_slice(b"true"),
        CanonicalValue::Bool(false) => out.extend_from_slice(b"false"),
        CanonicalValue::Number(n) => out.extend_from_slice(n.as_str().as_bytes()),
        CanonicalValue::String(s) => write_string(out, s),
        CanonicalValue::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(out, item);
            }
            out.push(b']');
        }
        CanonicalValue::Object(map) => write_object(out, map),
    }
}

/// Emits object members sorted by the byte-wise lexicographic order of the
/// keys' canonical string encodings (not their raw UTF-8). The two orders
/// diverge for non-ASCII keys, which escape to `\uXXXX` sequences.
fn write_object(
    out: &mut Vec<u8>,
    map: &std::collections::BTreeMap<String, CanonicalValue>,
) {
    let mut members: Vec<(Vec<u8>, &CanonicalValue)> = map
        .iter()
        .map(|(key, child)| {
            let mut encoded = Vec::with_capacity(key.len() + 2);
            write_string(&mut encoded, key);
            (encoded, child)
        })
        .collect();
    members.sort_by(|a, b| a.0.cmp(&b.0));

    out.push(b'{');
    for (i, (key, child)) in members.iter().enumerate() {
        if i > 0 {
            out.push(b',');
        }
        out.extend_from_slice(key);
        out.push(b':');
        write_value(out, child);
    }
    out.push(b'}');
}

/// Emits a string with the canonical escape rules: printable ASCII literal,
/// the six short escapes, `\u00xx` for remaining control characters, and
/// UTF-16 code-unit escapes (surrogate pairs above U+FFFF) for everything
/// non-ASCII.
fn write_string(out: &mut Vec<u8>, s: &str) {
    out.push(b'"');
    for ch in s.chars() {
        match ch {
            '"' => out.extend_from_slice(b"\\\""),
            '\\' => out.extend_from_slice(b"\\\\"),
            '\u{0008}' => out.extend_from_slice(b"\\b"),
            '\u{000C}' => out.extend_from_slice(b"\\f"),
            '\n' => out.extend_from_slice(b"\\n"),
            '\r' => out.extend_from_slice(b"\\r"),
            '\t' => out.extend_from_slice(b"\\t"),
            c if (c as u32) < 0x20 => write_unicode_escape(out, c as u16),
            c if (c as u32) <= 0x7E => out.push(c as u8),
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    write_unicode_escape(out, *unit);
                }
            }
        }
    }
    out.push(b'"');
}

fn write_unicode_escape(out: &mut Vec<u8>, unit: u16) {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    out.extend_from_slice(b"\\u");
    out.push(HEX[((unit >> 12) & 0x0F) as usize]);
    out.push(HEX[((unit >> 8) & 0x0F) as usize]);
    out.push(HEX[((unit >> 4) & 0x0F) as usize]);
    out.push(HEX[(unit & 0x0F) as usize]);
}
