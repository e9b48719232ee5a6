//! Core types for ProbRank

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A single client-supplied feature value.
///
/// Values are carried through reconciliation unchanged; interpretation is
/// left to the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    /// JSON null
    Null,
    /// JSON boolean
    Bool(bool),
    /// Any JSON number
    Number(f64),
    /// JSON string
    Text(String),
}

impl ScalarValue {
    /// The value substituted for features missing from a raw instance
    pub const DEFAULT: ScalarValue = ScalarValue::Number(0.0);

    /// Convert a JSON value, rejecting arrays and objects
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;

        match value {
            Value::Null => Some(Self::Null),
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => n.as_f64().map(Self::Number),
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Short type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Text(_) => "string",
        }
    }
}

impl Default for ScalarValue {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "'{s}'"),
        }
    }
}

/// Feature values supplied by a caller for one prediction instance.
///
/// May omit schema fields and may carry fields the schema does not know.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawInstance {
    fields: HashMap<String, ScalarValue>,
}

impl RawInstance {
    /// Create an empty instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Set a field
    pub fn insert(&mut self, name: impl Into<String>, value: ScalarValue) {
        self.fields.insert(name.into(), value);
    }

    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<&ScalarValue> {
        self.fields.get(name)
    }

    /// Number of supplied fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields were supplied
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over supplied field names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Build an instance from a decoded JSON value.
    ///
    /// The value must be an object whose members are scalars.
    pub fn from_json(instance_id: &str, value: &serde_json::Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            Error::processing(format!(
                "features for instance '{}' must be an object, got {}",
                instance_id,
                json_type_name(value)
            ))
        })?;

        let mut fields = HashMap::with_capacity(object.len());
        for (name, raw) in object {
            let scalar = ScalarValue::from_json(raw).ok_or_else(|| {
                Error::processing(format!(
                    "unsupported value for feature '{}' of instance '{}': expected a number, string, boolean or null, got {}",
                    name,
                    instance_id,
                    json_type_name(raw)
                ))
            })?;
            fields.insert(name.clone(), scalar);
        }

        Ok(Self { fields })
    }
}

impl<K: Into<String>> FromIterator<(K, ScalarValue)> for RawInstance {
    fn from_iter<I: IntoIterator<Item = (K, ScalarValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Ordered feature names the classifier was trained on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    /// Create a schema, rejecting empty or duplicated names
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(Error::config("feature schema must name at least one feature"));
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if name.is_empty() {
                return Err(Error::config("feature schema contains an empty feature name"));
            }
            if !seen.insert(name.as_str()) {
                return Err(Error::config(format!(
                    "feature schema lists '{}' more than once",
                    name
                )));
            }
        }

        Ok(Self { names })
    }

    /// Feature names in schema order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Iterate over feature names in schema order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Position of a feature within the schema
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false for a validated schema
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Feature values aligned to a [`FeatureSchema`], one per schema entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector {
    values: Vec<ScalarValue>,
}

impl FeatureVector {
    /// Wrap values that are already in schema order
    pub fn new(values: Vec<ScalarValue>) -> Self {
        Self { values }
    }

    /// Values in schema order
    pub fn values(&self) -> &[ScalarValue] {
        &self.values
    }

    /// Value at a schema position
    pub fn get(&self, index: usize) -> Option<&ScalarValue> {
        self.values.get(index)
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the vector is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<ScalarValue>> for FeatureVector {
    fn from(values: Vec<ScalarValue>) -> Self {
        Self::new(values)
    }
}

/// Display labels addressed by contiguous class index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    /// Create a label table where `labels[i]` names class `i`
    pub fn new<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(Error::config("label table must contain at least one label"));
        }

        let mut seen = HashSet::with_capacity(labels.len());
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(Error::config(format!(
                    "label table lists '{}' more than once",
                    label
                )));
            }
        }

        Ok(Self { labels })
    }

    /// Create a label table from an explicit index mapping.
    ///
    /// Indices must cover `0..N` exactly.
    pub fn from_indexed<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, S)>,
        S: Into<String>,
    {
        let mut pairs: Vec<(usize, String)> =
            pairs.into_iter().map(|(i, s)| (i, s.into())).collect();
        pairs.sort_by_key(|(i, _)| *i);

        for (expected, (index, _)) in pairs.iter().enumerate() {
            if *index != expected {
                return Err(Error::config(format!(
                    "label table indices must be contiguous from 0, missing index {}",
                    expected
                )));
            }
        }

        Self::new(pairs.into_iter().map(|(_, label)| label))
    }

    /// Label for a class index
    pub fn get(&self, class_index: usize) -> Option<&str> {
        self.labels.get(class_index).map(String::as_str)
    }

    /// Labels in class-index order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of classes
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false for a validated table
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for LabelTable {
    /// The regressor-recommendation labels the bundled model was trained with
    fn default() -> Self {
        Self {
            labels: [
                "XGBRegressor",
                "HUBERREGRESSOR",
                "LinearSVR",
                "LASSO",
                "QUANTILEREGRESSOR",
                "ELASTICNETCV",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}
