//! Batch prediction pipeline
//!
//! Runs reconciliation and ranking for every instance of a batch, in order,
//! against a classifier and label table fixed at construction time.

use crate::classifier::ProbabilisticClassifier;
use crate::{ranker, reconciler};
use probrank_core::{
    BatchRequest, BatchResponse, Error, FeatureSchema, LabelTable, RankedPrediction, RawInstance,
    Result,
};
use std::sync::Arc;
use tracing::{debug, warn, Level};

/// Reconcile → classify → rank, over whole batches.
///
/// Holds only immutable shared state; clones are cheap and safe to use from
/// any number of threads.
#[derive(Clone)]
pub struct PredictionPipeline {
    classifier: Arc<dyn ProbabilisticClassifier>,
    labels: Arc<LabelTable>,
}

impl PredictionPipeline {
    /// Create a pipeline, checking that the label table covers every class
    /// the classifier reports.
    pub fn new(classifier: Arc<dyn ProbabilisticClassifier>, labels: LabelTable) -> Result<Self> {
        if classifier.n_classes() != labels.len() {
            return Err(Error::config(format!(
                "label table has {} labels but classifier '{}' produces {} classes",
                labels.len(),
                classifier.name(),
                classifier.n_classes()
            )));
        }

        Ok(Self {
            classifier,
            labels: Arc::new(labels),
        })
    }

    /// Feature schema of the underlying classifier
    pub fn schema(&self) -> &FeatureSchema {
        self.classifier.expected_feature_names()
    }

    /// Label table used for ranking
    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// The classifier being served
    pub fn classifier(&self) -> &Arc<dyn ProbabilisticClassifier> {
        &self.classifier
    }

    /// Predict a single instance
    pub fn predict_instance(&self, instance_id: &str, raw: &RawInstance) -> Result<RankedPrediction> {
        let schema = self.schema();

        if tracing::enabled!(Level::DEBUG) {
            let missing = reconciler::missing_features(raw, schema);
            let unexpected = reconciler::unexpected_features(raw, schema);
            if !missing.is_empty() || !unexpected.is_empty() {
                debug!(
                    instance_id,
                    missing = missing.len(),
                    unexpected = unexpected.len(),
                    "Reconciled features"
                );
            }
        }

        let vector = reconciler::reconcile(raw, schema);
        ranker::rank(&vector, self.classifier.as_ref(), &self.labels)
    }

    /// Predict every instance of a batch.
    ///
    /// An empty batch fails with [`Error::InvalidRequest`] before the
    /// classifier is touched. The first failing instance aborts the whole
    /// batch; its error is promoted with [`Error::into_batch_failure`].
    pub fn handle_batch(&self, input: &BatchRequest) -> Result<BatchResponse> {
        if input.is_empty() {
            return Err(Error::no_input());
        }

        let mut response = BatchResponse::with_capacity(input.len());
        for (instance_id, raw) in input.iter() {
            let prediction = self.predict_instance(instance_id, raw).map_err(|e| {
                warn!(instance_id, error = %e, "Instance failed, aborting batch");
                e.into_batch_failure()
            })?;

            if let Some((label, p)) = prediction.top() {
                debug!(instance_id, top_label = label, top_probability = p, "Ranked instance");
            }

            response.push(instance_id, prediction);
        }

        Ok(response)
    }
}

impl std::fmt::Debug for PredictionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionPipeline")
            .field("classifier", &self.classifier.name())
            .field("features", &self.schema().len())
            .field("labels", &self.labels.labels())
            .finish()
    }
}
