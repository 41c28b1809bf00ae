use std::cmp::Ordering;
use std::str::FromStr;

use num_bigint::BigInt;

/// Compares two decimal strings with exact precision.
///
/// Both sides are split into sign, integer digits, and fractional digits,
/// scale-normalized by padding the shorter fraction with zeros, and compared
/// as big integers. Returns `None` when either side is not a plain decimal
/// literal; bounds never go through a binary float.
pub(crate) fn cmp_decimal(a: &str, b: &str) -> Option<Ordering> {
    let (a_digits, a_scale) = split_decimal(a)?;
    let (b_digits, b_scale) = split_decimal(b)?;
    let scale = a_scale.max(b_scale);
    let a_int = BigInt::from_str(&pad(a_digits, scale - a_scale)).ok()?;
    let b_int = BigInt::from_str(&pad(b_digits, scale - b_scale)).ok()?;
    Some(a_int.cmp(&b_int))
}

/// Splits `-12.34` into (`-1234`, 2). Accepts an optional sign, at least one
/// digit, and at most one decimal point with at least one digit after it.
fn split_decimal(text: &str) -> Option<(String, usize)> {
    let (sign, body) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let (int_part, frac_part) = match body.split_once('.') {
        Some((i, f)) => (i, f),
        None => (body, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }
    if body.contains('.') && frac_part.is_empty() {
        return None;
    }
    Some((format!("{sign}{int_part}{frac_part}"), frac_part.len()))
}

/// Appends `zeros` trailing zeros to the digit string, increasing its scale.
fn pad(digits: String, zeros: usize) -> String {
    if zeros == 0 {
        return digits;
    }
    let mut out = digits;
    out.push_str(&"0".repeat(zeros));
    out
}
