//! Latency benchmarks for the prediction pipeline
//!
//! Measures reconciliation, forest inference and full batch handling.
//!
//! Run with: cargo bench -p probrank-classifiers

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

use probrank_classifiers::{reconcile, DecisionTree, PredictionPipeline, RandomForest};
use probrank_core::{BatchRequest, FeatureSchema, LabelTable, RawInstance, ScalarValue};

const N_FEATURES: usize = 24;
const N_CLASSES: usize = 6;

fn feature_names() -> Vec<String> {
    (0..N_FEATURES).map(|i| format!("feature_{i}")).collect()
}

/// Forest of stumps splitting round-robin over the features
fn forest(n_trees: usize) -> RandomForest {
    let trees = (0..n_trees)
        .map(|t| {
            let mut left = vec![1.0; N_CLASSES];
            let mut right = vec![1.0; N_CLASSES];
            left[t % N_CLASSES] += 4.0;
            right[(t + 3) % N_CLASSES] += 4.0;
            DecisionTree::stump(t % N_FEATURES, 0.5, left, right)
        })
        .collect();

    let schema = FeatureSchema::new(feature_names()).expect("valid schema");
    RandomForest::new("bench", schema, N_CLASSES, trees).expect("valid forest")
}

fn instance(seed: usize) -> RawInstance {
    feature_names()
        .into_iter()
        .enumerate()
        .filter(|(i, _)| (i + seed) % 3 != 0)
        .map(|(i, name)| (name, ScalarValue::Number(((i * 7 + seed) % 10) as f64 / 10.0)))
        .chain(std::iter::once(("extra".to_string(), ScalarValue::Number(1.0))))
        .collect()
}

fn benchmark_reconcile(c: &mut Criterion) {
    let schema = FeatureSchema::new(feature_names()).expect("valid schema");
    let raw = instance(1);

    c.bench_function("reconcile_24_features", |b| {
        b.iter(|| reconcile(black_box(&raw), black_box(&schema)))
    });
}

fn benchmark_batches(c: &mut Criterion) {
    let pipeline = PredictionPipeline::new(Arc::new(forest(100)), LabelTable::default())
        .expect("labels match forest");

    let mut group = c.benchmark_group("handle_batch");
    for size in [1usize, 10, 100] {
        let mut batch = BatchRequest::new();
        for i in 0..size {
            batch.insert(format!("instance-{i}"), instance(i));
        }

        group.bench_with_input(BenchmarkId::from_parameter(size), &batch, |b, batch| {
            b.iter(|| pipeline.handle_batch(black_box(batch)).expect("prediction succeeds"))
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_reconcile, benchmark_batches);
criterion_main!(benches);
