//! Schema-driven field validation and action envelope construction.
//!
//! This crate gates admission into a VAX action history: a provider publishes
//! an [`ActionSchema`] describing the fields an action may carry, a producer
//! accumulates validated fields through the fluent [`ActionBuilder`], and a
//! consumer re-checks a finished envelope with [`validate_data`]. The two
//! paths agree: for a fixed `(schema, data)` pair, batch validation accepts
//! exactly when incremental `set` + `finalize` accepts.
//!
//! Validation errors are accumulated across all fields and reported together,
//! never one at a time.
//!
#![deny(missing_docs)]

/// Fluent schema and action builders.
pub mod builder;
/// Exact decimal comparison for schema bounds.
mod decimal;
/// Action envelope construction and strict parsing.
pub mod envelope;
/// Field specifications and schema transport form.
pub mod spec;
/// Batch validation of complete field maps.
pub mod validate;

pub use builder::{ActionBuilder, SchemaBuilder};
pub use envelope::{build_envelope, build_envelope_at, parse_envelope, ActionEnvelope};
pub use spec::{ActionSchema, FieldSpec, FieldType};
pub use validate::{validate_data, FieldError, FieldReason, SchemaError, ValidatedFieldSet};
