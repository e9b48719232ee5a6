//! Model artifact loading
//!
//! Artifacts are JSON or YAML documents tagged by `kind`:
//!
//! ```yaml
//! kind: random_forest
//! name: regressor-recommender
//! feature_names: [n_rows, n_features, skewness]
//! n_classes: 6
//! trees:
//!   - children_left: [1, -1, -1]
//!     children_right: [2, -1, -1]
//!     feature: [0, -2, -2]
//!     threshold: [1000.0, -2.0, -2.0]
//!     value: [[0, 0, 0, 0, 0, 0], [5, 1, 0, 0, 0, 0], [0, 0, 2, 4, 0, 1]]
//! ```
//!
//! A `calibrated` artifact replaces `trees` with `folds`, each holding
//! `trees` and `calibrators`.

use crate::calibrated::{CalibratedClassifier, CalibratedFold};
use crate::classifier::ProbabilisticClassifier;
use crate::forest::{DecisionTree, RandomForest};
use probrank_core::{Error, FeatureSchema, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Artifact file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// JSON document
    Json,
    /// YAML document
    Yaml,
}

impl ModelFormat {
    /// Pick a format from the file extension; anything but `.yaml`/`.yml` is JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

/// Serialized model, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    /// Plain averaged forest
    RandomForest {
        #[serde(default)]
        name: Option<String>,
        feature_names: Vec<String>,
        n_classes: usize,
        trees: Vec<DecisionTree>,
    },

    /// Forest folds with per-class calibration
    Calibrated {
        #[serde(default)]
        name: Option<String>,
        feature_names: Vec<String>,
        n_classes: usize,
        folds: Vec<CalibratedFold>,
    },
}

impl ModelArtifact {
    /// Parse an artifact from text in the given format
    pub fn parse(content: &str, format: ModelFormat) -> Result<Self> {
        match format {
            ModelFormat::Json => serde_json::from_str(content)
                .map_err(|e| Error::config(format!("invalid model artifact: {}", e))),
            ModelFormat::Yaml => serde_yaml::from_str(content)
                .map_err(|e| Error::config(format!("invalid model artifact: {}", e))),
        }
    }

    /// Read and parse an artifact file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("failed to read model artifact {}: {}", path.display(), e))
        })?;
        Self::parse(&content, ModelFormat::from_path(path))
    }

    /// Validate the artifact and build the classifier it describes.
    ///
    /// `default_name` is used when the artifact does not name itself.
    pub fn into_classifier(self, default_name: &str) -> Result<Arc<dyn ProbabilisticClassifier>> {
        let classifier: Arc<dyn ProbabilisticClassifier> = match self {
            Self::RandomForest {
                name,
                feature_names,
                n_classes,
                trees,
            } => Arc::new(RandomForest::new(
                name.unwrap_or_else(|| default_name.to_string()),
                FeatureSchema::new(feature_names)?,
                n_classes,
                trees,
            )?),
            Self::Calibrated {
                name,
                feature_names,
                n_classes,
                folds,
            } => Arc::new(CalibratedClassifier::new(
                name.unwrap_or_else(|| default_name.to_string()),
                FeatureSchema::new(feature_names)?,
                n_classes,
                folds,
            )?),
        };
        Ok(classifier)
    }
}

/// Load, validate and build the classifier stored at `path`
pub fn load_classifier(path: impl AsRef<Path>) -> Result<Arc<dyn ProbabilisticClassifier>> {
    let path = path.as_ref();
    info!("Loading model artifact: {}", path.display());

    let default_name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("model");
    let classifier = ModelArtifact::from_file(path)?.into_classifier(default_name)?;

    info!(
        model = classifier.name(),
        kind = classifier.kind().as_str(),
        features = classifier.expected_feature_names().len(),
        classes = classifier.n_classes(),
        "Model loaded"
    );
    Ok(classifier)
}
