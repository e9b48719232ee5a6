//! Shared application state

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use probrank_classifiers::{load_classifier, PredictionPipeline};
use std::sync::Arc;
use tracing::info;

use crate::config::ServerConfig;

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,

    /// Prediction pipeline over the loaded model
    pub pipeline: PredictionPipeline,

    /// Prometheus metrics handle for rendering
    pub metrics_handle: PrometheusHandle,
}

impl AppState {
    /// Load the model named by the configuration and build the pipeline
    pub fn new(config: ServerConfig, metrics_handle: PrometheusHandle) -> Result<Self> {
        info!("Initializing application state");

        let labels = config.label_table()?;
        info!("Label table: {} classes", labels.len());

        let classifier = load_classifier(&config.model_path)?;
        let pipeline = PredictionPipeline::new(classifier, labels)?;
        info!(
            "Serving model '{}' with {} features",
            pipeline.classifier().name(),
            pipeline.schema().len()
        );

        Ok(Self::with_pipeline(config, pipeline, metrics_handle))
    }

    /// Wrap an already-built pipeline
    pub fn with_pipeline(
        config: ServerConfig,
        pipeline: PredictionPipeline,
        metrics_handle: PrometheusHandle,
    ) -> Self {
        Self {
            config: Arc::new(config),
            pipeline,
            metrics_handle,
        }
    }
}
