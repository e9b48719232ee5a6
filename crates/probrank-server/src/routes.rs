//! HTTP routes and handlers

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use probrank_core::{BatchRequest, BatchResponse, Error, ErrorKind};
use serde::Serialize;
use serde_json::json;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, info_span, warn};

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let max_body_bytes = state.config.max_body_bytes;

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness))
        .route("/metrics", get(metrics))
        .route("/predict", post(predict))
        .fallback(fallback)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[derive(Debug, Serialize)]
struct ReadinessResponse<'a> {
    status: &'static str,
    model: &'a str,
    kind: &'static str,
    features: &'a [String],
    labels: &'a [String],
}

async fn readiness(State(state): State<AppState>) -> Response {
    let pipeline = &state.pipeline;
    let classifier = pipeline.classifier();

    Json(ReadinessResponse {
        status: "ready",
        model: classifier.name(),
        kind: classifier.kind().as_str(),
        features: pipeline.schema().names(),
        labels: pipeline.labels().labels(),
    })
    .into_response()
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}

/// Batch prediction handler.
///
/// Inference runs on the blocking pool; the body is decoded there too so a
/// large batch never holds an executor thread. A body that cannot be
/// buffered (over `max_body_bytes`, or a broken stream) is answered with
/// the rejection's status and a JSON error.
async fn predict(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    metrics::counter!("probrank_requests_total").increment(1);
    let body = body?;

    let request_id = uuid::Uuid::new_v4();
    let span = info_span!("predict", %request_id, body_bytes = body.len());

    let start = Instant::now();
    let pipeline = state.pipeline.clone();
    let task_span = span.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let _entered = task_span.enter();
        let batch = BatchRequest::from_json_slice(&body)?;
        debug!(instances = batch.len(), "Decoded batch");
        pipeline.handle_batch(&batch)
    })
    .await
    .map_err(|e| Error::internal(format!("prediction task failed: {}", e)));

    let latency = start.elapsed();
    metrics::histogram!("probrank_predict_latency_us").record(latency.as_micros() as f64);

    let _entered = span.enter();
    let response: BatchResponse = outcome.and_then(|result| result).map_err(ApiError::from)?;

    metrics::counter!("probrank_instances_total").increment(response.len() as u64);
    info!(
        instances = response.len(),
        latency_us = latency.as_micros() as u64,
        "Prediction complete"
    );

    Ok(Json(response).into_response())
}

async fn fallback() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
}

/// Request failure rendered as `{"error": "<message>"}`.
///
/// Missing input maps to 400, an unreadable body keeps the extractor's
/// status (413 when over the size limit), every other failure maps to 500.
#[derive(Debug)]
pub enum ApiError {
    /// Failure from decoding or predicting the batch
    Prediction(Error),
    /// The request body could not be buffered
    Body(BytesRejection),
}

impl ApiError {
    /// HTTP status for this failure
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Prediction(err) => match err.kind() {
                ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
                ErrorKind::SchemaMismatch | ErrorKind::Processing => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Body(rejection) => rejection.status(),
        }
    }

    /// Metrics label for this failure
    fn kind(&self) -> &'static str {
        match self {
            Self::Prediction(err) => err.kind().as_str(),
            Self::Body(_) => "body",
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Prediction(err) => err.to_string(),
            Self::Body(rejection) => rejection.body_text(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self::Prediction(err)
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        Self::Body(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        metrics::counter!("probrank_errors_total", "kind" => kind).increment(1);

        let message = self.message();
        if status.is_client_error() {
            warn!(error = %message, kind, "Rejected request");
        } else {
            error!(error = %message, kind, "Prediction failed");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
