//! Batch request and response containers

use crate::error::{Error, Result};
use crate::ordered::OrderedMap;
use crate::prediction::RankedPrediction;
use crate::types::{json_type_name, RawInstance};
use serde::{Deserialize, Serialize};

/// Named instances submitted together, in submission order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchRequest {
    instances: OrderedMap<RawInstance>,
}

impl BatchRequest {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style instance setter
    pub fn with(mut self, instance_id: impl Into<String>, raw: RawInstance) -> Self {
        self.instances.insert(instance_id, raw);
        self
    }

    /// Add an instance; a repeated id replaces the earlier features in place
    pub fn insert(&mut self, instance_id: impl Into<String>, raw: RawInstance) {
        self.instances.insert(instance_id, raw);
    }

    /// Iterate over `(instance_id, raw)` in submission order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawInstance)> {
        self.instances.iter()
    }

    /// Number of instances
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether the batch holds no instances
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Decode a request body.
    ///
    /// A blank body or a falsy JSON document (`null`, `false`, `0`, `""`,
    /// `[]`, `{}`) decodes to an empty batch, which the pipeline rejects as
    /// missing input. Malformed JSON and truthy non-object documents are
    /// processing errors.
    pub fn from_json_slice(body: &[u8]) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::new());
        }

        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| Error::processing(format!("failed to decode JSON body: {}", e)))?;

        Self::from_json(&value)
    }

    /// Build a batch from a decoded JSON document
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        if is_falsy(value) {
            return Ok(Self::new());
        }

        let object = value.as_object().ok_or_else(|| {
            Error::processing(format!(
                "request body must be an object mapping instance ids to features, got {}",
                json_type_name(value)
            ))
        })?;

        let mut instances = OrderedMap::with_capacity(object.len());
        for (instance_id, features) in object {
            instances.push(instance_id.clone(), RawInstance::from_json(instance_id, features)?);
        }

        Ok(Self { instances })
    }
}

fn is_falsy(value: &serde_json::Value) -> bool {
    use serde_json::Value;

    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Per-instance predictions keyed by instance id, in request order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchResponse {
    predictions: OrderedMap<RankedPrediction>,
}

impl BatchResponse {
    /// Create an empty response
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty response sized for `capacity` instances
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            predictions: OrderedMap::with_capacity(capacity),
        }
    }

    /// Append the prediction for the next instance
    pub fn push(&mut self, instance_id: impl Into<String>, prediction: RankedPrediction) {
        self.predictions.push(instance_id, prediction);
    }

    /// Prediction for an instance
    pub fn get(&self, instance_id: &str) -> Option<&RankedPrediction> {
        self.predictions.get(instance_id)
    }

    /// Instance ids in response order
    pub fn instance_ids(&self) -> impl Iterator<Item = &str> {
        self.predictions.keys()
    }

    /// Iterate over `(instance_id, prediction)` in response order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RankedPrediction)> {
        self.predictions.iter()
    }

    /// Number of instances
    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    /// Whether the response is empty
    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}
