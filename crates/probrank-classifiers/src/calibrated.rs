//! Calibrated tree-ensemble classifier
//!
//! Each fold pairs a base forest with one calibrator per class. A fold maps
//! the forest's raw class probabilities through its calibrators and
//! renormalizes; the classifier averages the folds.
//!
//! With two classes only the positive class (index 1) is calibrated and the
//! negative class takes the complement.

use crate::classifier::{ModelKind, ProbabilisticClassifier};
use crate::forest::{to_single_precision, validate_trees, DecisionTree};
use crate::numeric;
use probrank_core::{Error, FeatureSchema, FeatureVector, Result};
use serde::{Deserialize, Serialize};

/// Calibrated probabilities this close above 1 are clamped to exactly 1
const ONE_TOLERANCE: f64 = 1e-5;

/// Maps a raw class probability to a calibrated one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Calibrator {
    /// Platt scaling: `1 / (1 + exp(a * p + b))`
    Sigmoid { a: f64, b: f64 },

    /// Piecewise-linear interpolation through fitted points, clipped to the
    /// end points outside their range
    Isotonic {
        x_thresholds: Vec<f64>,
        y_thresholds: Vec<f64>,
    },
}

impl Calibrator {
    /// Apply the calibration curve
    pub fn apply(&self, p: f64) -> f64 {
        match self {
            Self::Sigmoid { a, b } => 1.0 / (1.0 + (a * p + b).exp()),
            Self::Isotonic {
                x_thresholds,
                y_thresholds,
            } => interpolate(x_thresholds, y_thresholds, p),
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            Self::Sigmoid { a, b } => {
                if !a.is_finite() || !b.is_finite() {
                    return Err(Error::config("sigmoid calibrator has non-finite parameters"));
                }
            }
            Self::Isotonic {
                x_thresholds,
                y_thresholds,
            } => {
                if x_thresholds.is_empty() || x_thresholds.len() != y_thresholds.len() {
                    return Err(Error::config(format!(
                        "isotonic calibrator needs matching non-empty thresholds, got {} x and {} y",
                        x_thresholds.len(),
                        y_thresholds.len()
                    )));
                }
                if x_thresholds.iter().chain(y_thresholds).any(|v| !v.is_finite()) {
                    return Err(Error::config("isotonic calibrator has non-finite thresholds"));
                }
                if y_thresholds.iter().any(|y| *y < 0.0) {
                    return Err(Error::config("isotonic calibrator y thresholds must be non-negative"));
                }
                if x_thresholds.windows(2).any(|w| w[0] > w[1]) {
                    return Err(Error::config("isotonic calibrator x thresholds must be sorted"));
                }
            }
        }
        Ok(())
    }
}

fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let last = xs.len() - 1;
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[last] {
        return ys[last];
    }

    // First point strictly greater than x; xs[hi - 1] <= x < xs[hi].
    let hi = xs.partition_point(|&t| t <= x);
    let lo = hi - 1;
    let span = xs[hi] - xs[lo];
    if span == 0.0 {
        return ys[hi];
    }
    ys[lo] + (x - xs[lo]) * (ys[hi] - ys[lo]) / span
}

/// A base forest and the calibrators fitted on its held-out predictions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibratedFold {
    /// Trees of the base forest
    pub trees: Vec<DecisionTree>,

    /// One calibrator per class, or a single one for binary problems
    pub calibrators: Vec<Calibrator>,
}

impl CalibratedFold {
    fn validate(&self, n_features: usize, n_classes: usize) -> Result<()> {
        validate_trees(&self.trees, n_features, n_classes)?;

        let expected = if n_classes == 2 { 1 } else { n_classes };
        if self.calibrators.len() != expected {
            return Err(Error::config(format!(
                "expected {} calibrators for {} classes, got {}",
                expected,
                n_classes,
                self.calibrators.len()
            )));
        }
        self.calibrators.iter().try_for_each(Calibrator::validate)
    }

    fn predict(&self, x: &[f32], n_classes: usize) -> Vec<f64> {
        let mut raw = vec![0.0; n_classes];
        for tree in &self.trees {
            for (acc, p) in raw.iter_mut().zip(tree.predict_proba(x)) {
                *acc += p;
            }
        }
        let n_trees = self.trees.len() as f64;
        raw.iter_mut().for_each(|p| *p /= n_trees);

        let mut proba = vec![0.0; n_classes];
        if n_classes == 2 {
            proba[1] = self.calibrators[0].apply(raw[1]);
            proba[0] = 1.0 - proba[1];
        } else {
            for (class_index, calibrator) in self.calibrators.iter().enumerate() {
                proba[class_index] = calibrator.apply(raw[class_index]);
            }
            let total: f64 = proba.iter().sum();
            if total == 0.0 {
                proba.fill(1.0 / n_classes as f64);
            } else {
                proba.iter_mut().for_each(|p| *p /= total);
            }
        }

        for p in proba.iter_mut() {
            if *p > 1.0 && *p <= 1.0 + ONE_TOLERANCE {
                *p = 1.0;
            }
        }
        proba
    }
}

/// Ensemble of calibrated folds
#[derive(Debug, Clone)]
pub struct CalibratedClassifier {
    name: String,
    schema: FeatureSchema,
    n_classes: usize,
    folds: Vec<CalibratedFold>,
}

impl CalibratedClassifier {
    /// Create a calibrated classifier, validating every fold
    pub fn new(
        name: impl Into<String>,
        schema: FeatureSchema,
        n_classes: usize,
        folds: Vec<CalibratedFold>,
    ) -> Result<Self> {
        if folds.is_empty() {
            return Err(Error::config("calibrated classifier has no folds"));
        }
        for (i, fold) in folds.iter().enumerate() {
            fold.validate(schema.len(), n_classes).map_err(|e| match e {
                Error::Config(msg) => Error::config(format!("fold {}: {}", i, msg)),
                other => other,
            })?;
        }

        Ok(Self {
            name: name.into(),
            schema,
            n_classes,
            folds,
        })
    }

    /// Calibrated class distribution for an already-encoded sample
    pub fn predict_encoded(&self, x: &[f64]) -> Result<Vec<f64>> {
        let x = to_single_precision(x, &self.schema)?;

        let mut proba = vec![0.0; self.n_classes];
        for fold in &self.folds {
            for (acc, p) in proba.iter_mut().zip(fold.predict(&x, self.n_classes)) {
                *acc += p;
            }
        }

        let n_folds = self.folds.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n_folds);
        Ok(proba)
    }
}

impl ProbabilisticClassifier for CalibratedClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn expected_feature_names(&self) -> &FeatureSchema {
        &self.schema
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_probabilities(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        let x = numeric::encode(features, &self.schema)?;
        self.predict_encoded(&x)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Calibrated
    }
}
