//! ProbRank Core
//!
//! Core types shared across ProbRank components.
//!
//! This crate provides:
//! - The request/response data model (raw instances, feature vectors, ranked predictions)
//! - Process-wide immutable state types (feature schema, label table)
//! - An insertion-ordered map used wherever iteration order carries meaning
//! - Error types and result handling

pub mod batch;
pub mod error;
pub mod ordered;
pub mod prediction;
pub mod types;

pub use batch::{BatchRequest, BatchResponse};
pub use error::{Error, ErrorKind, Result, NO_INPUT_MESSAGE};
pub use ordered::OrderedMap;
pub use prediction::{round_probability, RankedPrediction, PROBABILITY_DECIMALS};
pub use types::{FeatureSchema, FeatureVector, LabelTable, RawInstance, ScalarValue};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::batch::{BatchRequest, BatchResponse};
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::prediction::RankedPrediction;
    pub use crate::types::{FeatureSchema, FeatureVector, LabelTable, RawInstance, ScalarValue};
}
