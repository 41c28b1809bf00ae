use regex::Regex;

use crate::encoder::EncodingError;

/// A canonical decimal number.
///
/// The inner text is always in normalized form: pure decimal digits with at
/// most one leading `-` and one `.`, no scientific notation, no leading zeros
/// except the bare digit `0`, no trailing fractional zeros, and never `-0`.
/// Because normalization happens at construction, encoding a `Number` is
/// infallible and byte-exact.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Number(String);

impl Number {
    /// Parses a decimal literal into its normalized form.
    ///
    /// Rejects scientific notation, leading zeros (`01`), a bare `.`, and
    /// anything else outside `^-?(0|[1-9][0-9]*)(\.[0-9]+)?$`. Negative zero
    /// in any spelling (`-0`, `-0.000`) normalizes to `0`; trailing
    /// fractional zeros are stripped exactly, without any float round-trip.
    pub fn parse(text: &str) -> Result<Self, EncodingError> {
        let re = Regex::new(r"^-?(0|[1-9][0-9]*)(\.[0-9]+)?$").expect("invalid regex");
        if !re.is_match(text) {
            return Err(EncodingError::InvalidNumber(text.to_string()));
        }
        Ok(Self(normalize(text)))
    }

    /// Converts a binary float into its canonical decimal form.
    ///
    /// NaN and infinities are rejected. Values whose shortest round-trip
    /// representation requires scientific notation (the ryu shortest form,
    /// e.g. `1e100` or `1e-7`) are rejected as well; this is the magnitude
    /// threshold applied consistently for all float inputs. `-0.0`
    /// normalizes to `0`.
    pub fn from_f64(value: f64) -> Result<Self, EncodingError> {
        if !value.is_finite() {
            return Err(EncodingError::InvalidNumber(value.to_string()));
        }
        if value == 0.0 {
            return Ok(Self("0".to_string()));
        }
        let mut buffer = ryu::Buffer::new();
        let shortest = buffer.format_finite(value);
        if shortest.contains(['e', 'E']) {
            return Err(EncodingError::InvalidNumber(shortest.to_string()));
        }
        Ok(Self(normalize(shortest)))
    }

    /// Constructs a number from a signed integer.
    pub fn from_i64(value: i64) -> Self {
        Self(value.to_string())
    }

    /// Constructs a number from an unsigned integer.
    pub fn from_u64(value: u64) -> Self {
        Self(value.to_string())
    }

    /// Returns the normalized decimal text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the number has no fractional part.
    pub fn is_integer(&self) -> bool {
        !self.0.contains('.')
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strips trailing fractional zeros and collapses negative zero.
///
/// Input must already match the decimal literal pattern.
fn normalize(text: &str) -> String {
    let mut out = text.to_string();
    if out.contains('.') {
        while out.ends_with('0') {
            out.pop();
        }
        if out.ends_with('.') {
            out.pop();
        }
    }
    if out == "-0" {
        out = "0".to_string();
    }
    out
}
