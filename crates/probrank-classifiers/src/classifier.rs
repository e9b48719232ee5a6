//! Classifier trait and common types

use probrank_core::{FeatureSchema, FeatureVector, Result};

/// Trait for all probabilistic classifiers served by ProbRank.
///
/// Implementations hold only immutable state, so one instance can serve
/// concurrent requests without synchronization.
pub trait ProbabilisticClassifier: Send + Sync {
    /// Get the classifier name
    fn name(&self) -> &str;

    /// Feature names the model was trained on, in input order
    fn expected_feature_names(&self) -> &FeatureSchema;

    /// Number of probabilities produced per prediction
    fn n_classes(&self) -> usize;

    /// Per-class probabilities for one feature vector, indexed by class
    fn predict_probabilities(&self, features: &FeatureVector) -> Result<Vec<f64>>;

    /// Get the model family
    fn kind(&self) -> ModelKind {
        ModelKind::External
    }
}

/// Model family, reported by the readiness endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// Averaged decision-tree ensemble
    RandomForest,
    /// Tree ensemble with per-class probability calibration
    Calibrated,
    /// Any implementation provided outside this crate
    External,
}

impl ModelKind {
    /// Stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RandomForest => "random_forest",
            Self::Calibrated => "calibrated",
            Self::External => "external",
        }
    }
}
