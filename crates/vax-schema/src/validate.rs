use std::cmp::Ordering;
use std::collections::BTreeMap;

use thiserror::Error;
use vax_canonical::CanonicalValue;

use crate::decimal::cmp_decimal;
use crate::spec::{ActionSchema, FieldSpec, FieldType};

/// A complete, validated field map ready for envelope construction.
pub type ValidatedFieldSet = BTreeMap<String, CanonicalValue>;

/// Why a single field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldReason {
    /// The field does not appear in the schema.
    #[error("unknown field")]
    Unknown,
    /// A schema field was never successfully set.
    #[error("missing field")]
    Missing,
    /// Expected a string value.
    #[error("expected string")]
    ExpectedString,
    /// Expected a number value.
    #[error("expected number")]
    ExpectedNumber,
    /// The value is not a member of the enum.
    #[error("value {0:?} not in enum")]
    NotInEnum(String),
    /// String length fell outside the schema bounds.
    #[error("string length {len} outside bounds [{min}, {max}]")]
    LengthOutOfBounds {
        /// Character count of the value.
        len: usize,
        /// Lower bound text (`*` when unbounded).
        min: String,
        /// Upper bound text (`*` when unbounded).
        max: String,
    },
    /// Numeric value fell outside the schema bounds.
    #[error("number {value} outside bounds [{min}, {max}]")]
    OutOfRange {
        /// Canonical decimal text of the value.
        value: String,
        /// Lower bound text (`*` when unbounded).
        min: String,
        /// Upper bound text (`*` when unbounded).
        max: String,
    },
    /// The value could not be converted into a canonical value.
    #[error("invalid value: {0}")]
    Invalid(String),
}

/// One field-scoped validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field {field}: {reason}")]
pub struct FieldError {
    /// Name of the offending field.
    pub field: String,
    /// What went wrong.
    pub reason: FieldReason,
}

impl FieldError {
    /// Constructs a field error.
    pub fn new(field: impl Into<String>, reason: FieldReason) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }
}

/// Schema validation failure carrying every accumulated field error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// One or more fields violated the schema. All failures are reported
    /// together, not just the first.
    #[error("validation failed: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    ValidationFailed(Vec<FieldError>),
}

impl SchemaError {
    /// The per-field failures behind this error.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            SchemaError::ValidationFailed(errors) => errors,
        }
    }
}

/// Batch-validates an already-complete field map against a schema.
///
/// Checks missing required fields, unknown extra fields, and per-field
/// type/range/enum constraints, accumulating every failure. Accepts exactly
/// the maps that incremental [`crate::ActionBuilder`] `set` + `finalize`
/// accepts for the same data.
pub fn validate_data(fields: &ValidatedFieldSet, schema: &ActionSchema) -> Result<(), SchemaError> {
    let mut errors = Vec::new();
    for (name, _) in schema.iter() {
        if !fields.contains_key(name) {
            errors.push(FieldError::new(name.clone(), FieldReason::Missing));
        }
    }
    for (name, value) in fields {
        match schema.get(name) {
            None => errors.push(FieldError::new(name.clone(), FieldReason::Unknown)),
            Some(spec) => {
                if let Err(reason) = validate_value(value, spec) {
                    errors.push(FieldError::new(name.clone(), reason));
                }
            }
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::ValidationFailed(errors))
    }
}

/// Validates one value against one field spec.
pub(crate) fn validate_value(value: &CanonicalValue, spec: &FieldSpec) -> Result<(), FieldReason> {
    match spec.field_type {
        FieldType::String => validate_string(value, spec),
        FieldType::Number => validate_number(value, spec),
    }
}

fn validate_string(value: &CanonicalValue, spec: &FieldSpec) -> Result<(), FieldReason> {
    let text = value.as_str().ok_or(FieldReason::ExpectedString)?;

    if !spec.enum_values.is_empty() {
        if spec.enum_values.iter().any(|allowed| allowed == text) {
            return Ok(());
        }
        return Err(FieldReason::NotInEnum(text.to_string()));
    }

    let len = text.chars().count();
    // Bounds are parsed numerically from the bound strings; a bound that
    // fails to parse as an integer is skipped rather than compared lexically.
    let min = spec.min.as_deref().and_then(|b| b.parse::<usize>().ok());
    let max = spec.max.as_deref().and_then(|b| b.parse::<usize>().ok());
    let below = min.is_some_and(|m| len < m);
    let above = max.is_some_and(|m| len > m);
    if below || above {
        return Err(FieldReason::LengthOutOfBounds {
            len,
            min: spec.min.clone().unwrap_or_else(|| "*".to_string()),
            max: spec.max.clone().unwrap_or_else(|| "*".to_string()),
        });
    }
    Ok(())
}

fn validate_number(value: &CanonicalValue, spec: &FieldSpec) -> Result<(), FieldReason> {
    let number = value.as_number().ok_or(FieldReason::ExpectedNumber)?;
    let text = number.as_str();

    // Inclusive at both ends; exact decimal comparison. A bound that is not
    // a valid decimal rejects the value (a broken schema must not admit).
    let below_min = match spec.min.as_deref() {
        Some(bound) => !matches!(cmp_decimal(text, bound), Some(Ordering::Greater | Ordering::Equal)),
        None => false,
    };
    let above_max = match spec.max.as_deref() {
        Some(bound) => !matches!(cmp_decimal(text, bound), Some(Ordering::Less | Ordering::Equal)),
        None => false,
    };
    if below_min || above_max {
        return Err(FieldReason::OutOfRange {
            value: text.to_string(),
            min: spec.min.clone().unwrap_or_else(|| "*".to_string()),
            max: spec.max.clone().unwrap_or_else(|| "*".to_string()),
        });
    }
    Ok(())
}
