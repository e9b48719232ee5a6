//! Integration tests for the ProbRank HTTP API

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use probrank_classifiers::{PredictionPipeline, ProbabilisticClassifier};
use probrank_core::{FeatureSchema, FeatureVector, LabelTable, Result};
use probrank_server::{create_router, AppState, ServerConfig};
use std::io::Write;
use std::sync::Arc;
use tower::ServiceExt;

/// Returns fixed probabilities regardless of input
struct FixedClassifier {
    schema: FeatureSchema,
    reported_classes: usize,
    output: Vec<f64>,
}

impl FixedClassifier {
    fn new(output: Vec<f64>) -> Self {
        Self {
            schema: FeatureSchema::new(["f1", "f2"]).unwrap(),
            reported_classes: output.len(),
            output,
        }
    }
}

impl ProbabilisticClassifier for FixedClassifier {
    fn name(&self) -> &str {
        "fixed"
    }

    fn expected_feature_names(&self) -> &FeatureSchema {
        &self.schema
    }

    fn n_classes(&self) -> usize {
        self.reported_classes
    }

    fn predict_probabilities(&self, _features: &FeatureVector) -> Result<Vec<f64>> {
        Ok(self.output.clone())
    }
}

fn app_with(classifier: FixedClassifier, config: ServerConfig) -> Router {
    let labels = LabelTable::from_indexed([(0, "X"), (1, "Y")]).unwrap();
    let pipeline = PredictionPipeline::new(Arc::new(classifier), labels).unwrap();
    let handle = PrometheusBuilder::new().build_recorder().handle();
    create_router(AppState::with_pipeline(config, pipeline, handle))
}

fn app() -> Router {
    app_with(FixedClassifier::new(vec![0.3, 0.7]), ServerConfig::default())
}

async fn post_predict(app: Router, body: impl Into<Body>) -> (StatusCode, String) {
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_predict_ranks_labels() {
    let (status, body) = post_predict(app(), r#"{"a": {"f1": 1.0}}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"a":{"Y":0.7,"X":0.3}}"#);
}

#[tokio::test]
async fn test_predict_preserves_instance_order() {
    let (status, body) = post_predict(
        app(),
        r#"{"zulu": {"f1": 1}, "alpha": {"extra": 2}, "mike": {}}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        r#"{"zulu":{"Y":0.7,"X":0.3},"alpha":{"Y":0.7,"X":0.3},"mike":{"Y":0.7,"X":0.3}}"#
    );
}

#[tokio::test]
async fn test_empty_object_is_bad_request() {
    let (status, body) = post_predict(app(), "{}").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"No input data provided"}"#);
}

#[tokio::test]
async fn test_absent_body_is_bad_request() {
    let (status, body) = post_predict(app(), Body::empty()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"No input data provided"}"#);
}

#[tokio::test]
async fn test_null_body_is_bad_request() {
    let (status, _) = post_predict(app(), "null").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_schema_mismatch_is_server_error_and_server_survives() {
    let mut classifier = FixedClassifier::new(vec![0.2, 0.3, 0.5]);
    classifier.reported_classes = 2;
    let app = app_with(classifier, ServerConfig::default());

    let (status, body) = post_predict(app.clone(), r#"{"a": {"f1": 1.0}}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("schema mismatch"));

    let (status, _) = send(
        app,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_json_is_server_error() {
    let (status, body) = post_predict(app(), "{not json").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(json["error"].as_str().unwrap().starts_with("failed to decode JSON body"));
}

#[tokio::test]
async fn test_non_object_instance_is_server_error() {
    let (status, body) = post_predict(app(), r#"{"a": {"f1": 1}, "b": 7}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("instance 'b' must be an object"));
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let config = ServerConfig {
        max_body_bytes: 64,
        ..ServerConfig::default()
    };
    let app = app_with(FixedClassifier::new(vec![0.3, 0.7]), config);

    let big = format!(r#"{{"a": {{"f1": "{}"}}}}"#, "x".repeat(256));

    // Streamed body without a length header
    let (status, body) = post_predict(app.clone(), big.clone()).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("length limit exceeded"));

    // Declared length over the limit
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .header("content-length", big.len())
        .body(Body::from(big))
        .unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_health_and_readiness() {
    let (status, body) = send(
        app(),
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");

    let (status, body) = send(
        app(),
        Request::builder().uri("/ready").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["model"], "fixed");
    assert_eq!(json["kind"], "external");
    assert_eq!(json["features"], serde_json::json!(["f1", "f2"]));
    assert_eq!(json["labels"], serde_json::json!(["X", "Y"]));
}

#[tokio::test]
async fn test_metrics_endpoint_renders() {
    let (status, _) = send(
        app(),
        Request::builder().uri("/metrics").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (status, body) = send(
        app(),
        Request::builder().uri("/nope").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"Not found"}"#);
}

#[tokio::test]
async fn test_state_loads_model_artifact_from_config() {
    let artifact = r#"{
        "kind": "random_forest",
        "name": "file-forest",
        "feature_names": ["f1", "f2"],
        "n_classes": 2,
        "trees": [{
            "children_left": [1, -1, -1],
            "children_right": [2, -1, -1],
            "feature": [0, -2, -2],
            "threshold": [0.5, -2.0, -2.0],
            "value": [[0, 0], [9, 1], [1, 3]]
        }]
    }"#;
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(artifact.as_bytes()).unwrap();

    let config: ServerConfig = serde_yaml::from_str(&format!(
        "model_path: {}\nlabels: [X, Y]\n",
        file.path().display()
    ))
    .unwrap();
    let handle = PrometheusBuilder::new().build_recorder().handle();
    let app = create_router(AppState::new(config, handle).unwrap());

    let (status, body) = post_predict(
        app,
        r#"{"lo": {"f1": 0}, "hi": {"f1": "2", "extra": "ignored"}}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"lo":{"X":0.9,"Y":0.1},"hi":{"Y":0.75,"X":0.25}}"#);
}

#[tokio::test]
async fn test_state_rejects_label_count_mismatch() {
    let artifact = r#"{
        "kind": "random_forest",
        "feature_names": ["f1"],
        "n_classes": 2,
        "trees": [{
            "children_left": [-1],
            "children_right": [-1],
            "feature": [-2],
            "threshold": [-2.0],
            "value": [[1, 1]]
        }]
    }"#;
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(artifact.as_bytes()).unwrap();

    let config = ServerConfig {
        model_path: file.path().to_path_buf(),
        ..ServerConfig::default()
    };
    let handle = PrometheusBuilder::new().build_recorder().handle();

    // Default label table has six classes, the artifact two.
    assert!(AppState::new(config, handle).is_err());
}
