use std::collections::BTreeMap;
use std::fmt::Display;

use chrono::Utc;
use vax_canonical::CanonicalValue;

use crate::envelope::build_envelope_at;
use crate::spec::{ActionSchema, FieldSpec, FieldType};
use crate::validate::{validate_value, FieldError, FieldReason, SchemaError, ValidatedFieldSet};

/// Fluent constructor for an [`ActionSchema`].
///
/// ```
/// use vax_schema::SchemaBuilder;
///
/// let schema = SchemaBuilder::new()
///     .set_string_length("name", 1, 50)
///     .set_number_range("amount", "0", "1000000")
///     .build();
/// assert_eq!(schema.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    fields: BTreeMap<String, FieldSpec>,
}

impl SchemaBuilder {
    /// Starts an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a string field whose character count must fall in `[min, max]`.
    pub fn set_string_length(mut self, field: impl Into<String>, min: usize, max: usize) -> Self {
        self.fields.insert(
            field.into(),
            FieldSpec {
                field_type: FieldType::String,
                min: Some(min.to_string()),
                max: Some(max.to_string()),
                enum_values: Vec::new(),
            },
        );
        self
    }

    /// Adds a number field whose value must fall in `[min, max]`.
    ///
    /// Bounds are exact decimal strings so that no precision is lost before
    /// comparison.
    pub fn set_number_range(
        mut self,
        field: impl Into<String>,
        min: impl Into<String>,
        max: impl Into<String>,
    ) -> Self {
        self.fields.insert(
            field.into(),
            FieldSpec {
                field_type: FieldType::Number,
                min: Some(min.into()),
                max: Some(max.into()),
                enum_values: Vec::new(),
            },
        );
        self
    }

    /// Adds a string field restricted to exact membership in `values`.
    pub fn set_enum<I, S>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.insert(
            field.into(),
            FieldSpec {
                field_type: FieldType::String,
                min: None,
                max: None,
                enum_values: values.into_iter().map(Into::into).collect(),
            },
        );
        self
    }

    /// Snapshots the accumulated fields into an immutable schema.
    pub fn build(&self) -> ActionSchema {
        ActionSchema::new(self.fields.clone())
    }
}

/// Incremental, schema-checked action constructor.
///
/// Each [`set`](ActionBuilder::set) validates its field on the spot; failures
/// are accumulated rather than aborting the chain, so a single `finalize`
/// reports every problem at once. Only values that passed validation are kept.
#[derive(Debug, Clone)]
pub struct ActionBuilder {
    action_type: String,
    schema: ActionSchema,
    fields: ValidatedFieldSet,
    errors: Vec<FieldError>,
}

impl ActionBuilder {
    /// Starts building an action of the given type against a schema.
    pub fn new(action_type: impl Into<String>, schema: ActionSchema) -> Self {
        Self {
            action_type: action_type.into(),
            schema,
            fields: BTreeMap::new(),
            errors: Vec::new(),
        }
    }

    /// Sets one field, validating it immediately against the schema.
    ///
    /// Accepts anything convertible into a [`CanonicalValue`], including
    /// `f64` (which fails conversion for NaN, infinities, and magnitudes
    /// outside the plain-decimal range).
    pub fn set<V>(mut self, field: impl Into<String>, value: V) -> Self
    where
        V: TryInto<CanonicalValue>,
        V::Error: Display,
    {
        let field = field.into();
        let spec = match self.schema.get(&field) {
            Some(spec) => spec.clone(),
            None => {
                self.errors.push(FieldError::new(field, FieldReason::Unknown));
                return self;
            }
        };
        let value = match value.try_into() {
            Ok(value) => value,
            Err(err) => {
                self.errors
                    .push(FieldError::new(field, FieldReason::Invalid(err.to_string())));
                return self;
            }
        };
        match validate_value(&value, &spec) {
            Ok(()) => {
                self.fields.insert(field, value);
            }
            Err(reason) => {
                self.errors.push(FieldError::new(field, reason));
            }
        }
        self
    }

    /// Finalizes the action with the current wall-clock timestamp.
    pub fn finalize(self) -> Result<Vec<u8>, SchemaError> {
        let timestamp = Utc::now().timestamp_millis();
        self.finalize_at(timestamp)
    }

    /// Finalizes the action at an explicit unix-millisecond timestamp,
    /// producing canonical envelope bytes.
    ///
    /// Fails if any `set` call failed or any schema field was never
    /// successfully set; all failures are reported together.
    pub fn finalize_at(self, timestamp: i64) -> Result<Vec<u8>, SchemaError> {
        let mut errors = self.errors;
        for (name, _) in self.schema.iter() {
            if !self.fields.contains_key(name) {
                errors.push(FieldError::new(name.clone(), FieldReason::Missing));
            }
        }
        if !errors.is_empty() {
            return Err(SchemaError::ValidationFailed(errors));
        }
        Ok(build_envelope_at(&self.action_type, timestamp, &self.fields))
    }
}
