use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Value type a field is allowed to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// UTF-8 string field.
    String,
    /// Decimal number field.
    Number,
}

/// Constraint set for a single schema field.
///
/// Bounds are kept as exact decimal strings; they are never parsed through a
/// binary float. For string fields `min`/`max` bound the character count, for
/// number fields they bound the value itself (inclusive at both ends). A
/// non-empty `enum_values` list restricts a string field to exact membership
/// and bypasses the length bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field value type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Inclusive lower bound, as an exact decimal string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    /// Inclusive upper bound, as an exact decimal string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
    /// Allowed values for an enumerated string field.
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
}

/// Immutable field-name to [`FieldSpec`] mapping published by a schema
/// provider. Every schema field is required; a field absent from the schema
/// is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionSchema {
    fields: BTreeMap<String, FieldSpec>,
}

impl ActionSchema {
    /// Builds a schema from an already-assembled field map.
    pub fn new(fields: BTreeMap<String, FieldSpec>) -> Self {
        Self { fields }
    }

    /// Looks up the spec for a field.
    pub fn get(&self, field: &str) -> Option<&FieldSpec> {
        self.fields.get(field)
    }

    /// Iterates over `(field, spec)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldSpec)> {
        self.fields.iter()
    }

    /// Number of fields in the schema.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Serializes the schema into its cross-service transport form:
    /// `{"type":"object","properties":{field:{type,min?,max?,enum?}}}`.
    pub fn to_transport(&self) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        for (name, spec) in &self.fields {
            // FieldSpec serialization cannot fail: it is a plain struct of
            // strings and an enum tag.
            let value = serde_json::to_value(spec).expect("field spec serialization");
            properties.insert(name.clone(), value);
        }
        serde_json::json!({
            "type": "object",
            "properties": properties,
        })
    }

    /// Parses the transport form back into a schema.
    ///
    /// Tolerant by design: unknown keys are ignored, entries without a
    /// recognizable `type` are skipped, and missing optional keys default.
    pub fn from_transport(value: &serde_json::Value) -> Self {
        let mut fields = BTreeMap::new();
        let properties = match value.get("properties").and_then(|p| p.as_object()) {
            Some(map) => map,
            None => return Self::default(),
        };
        for (name, entry) in properties {
            let entry = match entry.as_object() {
                Some(map) => map,
                None => continue,
            };
            let field_type = match entry.get("type").and_then(|t| t.as_str()) {
                Some("string") => FieldType::String,
                Some("number") => FieldType::Number,
                _ => continue,
            };
            let bound = |key: &str| {
                entry
                    .get(key)
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string())
            };
            let enum_values = entry
                .get("enum")
                .and_then(|v| v.as_array())
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| item.as_str().map(|s| s.to_string()))
                        .collect()
                })
                .unwrap_or_default();
            fields.insert(
                name.clone(),
                FieldSpec {
                    field_type,
                    min: bound("min"),
                    max: bound("max"),
                    enum_values,
                },
            );
        }
        Self { fields }
    }
}
