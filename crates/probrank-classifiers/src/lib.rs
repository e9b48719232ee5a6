//! ProbRank Classifiers
//!
//! The prediction-request pipeline and the models it serves.
//!
//! A request flows through two stages per instance:
//! - [`reconciler`] aligns raw client features to the model's feature schema
//! - [`ranker`] invokes the classifier and ranks labelled probabilities
//!
//! [`pipeline::PredictionPipeline`] runs both stages over a whole batch.
//! Concrete models ([`forest::RandomForest`], [`calibrated::CalibratedClassifier`])
//! are loaded from JSON or YAML artifacts by [`model_loader`].

pub mod calibrated;
pub mod classifier;
pub mod forest;
pub mod model_loader;
pub mod numeric;
pub mod pipeline;
pub mod ranker;
pub mod reconciler;

pub use calibrated::{CalibratedClassifier, CalibratedFold, Calibrator};
pub use classifier::{ModelKind, ProbabilisticClassifier};
pub use forest::{DecisionTree, RandomForest};
pub use model_loader::{load_classifier, ModelArtifact, ModelFormat};
pub use pipeline::PredictionPipeline;
pub use ranker::rank;
pub use reconciler::reconcile;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{ModelKind, ProbabilisticClassifier};
    pub use crate::model_loader::load_classifier;
    pub use crate::pipeline::PredictionPipeline;
    pub use crate::ranker::rank;
    pub use crate::reconciler::reconcile;
}
