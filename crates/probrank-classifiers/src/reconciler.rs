//! Feature reconciliation
//!
//! Aligns a caller's raw feature set to the exact vector shape the
//! classifier expects.

use probrank_core::{FeatureSchema, FeatureVector, RawInstance, ScalarValue};

/// Build a vector with one value per schema entry, in schema order.
///
/// Schema fields the caller omitted become [`ScalarValue::DEFAULT`] (`0`).
/// Fields the schema does not name are dropped. Supplied values are passed
/// through unchanged.
pub fn reconcile(raw: &RawInstance, schema: &FeatureSchema) -> FeatureVector {
    schema
        .iter()
        .map(|name| raw.get(name).cloned().unwrap_or(ScalarValue::DEFAULT))
        .collect::<Vec<_>>()
        .into()
}

/// Schema fields the caller did not supply
pub fn missing_features<'a>(raw: &RawInstance, schema: &'a FeatureSchema) -> Vec<&'a str> {
    schema.iter().filter(|name| raw.get(name).is_none()).collect()
}

/// Supplied fields the schema does not name
pub fn unexpected_features<'a>(raw: &'a RawInstance, schema: &FeatureSchema) -> Vec<&'a str> {
    raw.names().filter(|name| schema.position(name).is_none()).collect()
}
