//! Prediction ranking
//!
//! Turns the classifier's class-indexed probabilities into a labelled
//! ranking.

use crate::classifier::ProbabilisticClassifier;
use probrank_core::{Error, FeatureVector, LabelTable, RankedPrediction, Result};

/// Classify one reconciled vector and rank the labelled probabilities.
///
/// Fails with [`Error::SchemaMismatch`] when the classifier returns a
/// different number of probabilities than the label table has labels; the
/// output is never truncated or padded.
pub fn rank(
    vector: &FeatureVector,
    classifier: &dyn ProbabilisticClassifier,
    labels: &LabelTable,
) -> Result<RankedPrediction> {
    let probabilities = classifier.predict_probabilities(vector)?;

    if probabilities.len() != labels.len() {
        return Err(Error::SchemaMismatch {
            expected: labels.len(),
            actual: probabilities.len(),
        });
    }

    if let Some((class_index, p)) = probabilities
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_finite())
    {
        return Err(Error::classifier(format!(
            "classifier '{}' returned non-finite probability {} for class {}",
            classifier.name(),
            p,
            class_index
        )));
    }

    Ok(RankedPrediction::from_scores(
        labels
            .labels()
            .iter()
            .map(String::as_str)
            .zip(probabilities),
    ))
}
