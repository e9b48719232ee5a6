//! Random forest classifier
//!
//! Trees are stored in flat array form: node `i` splits on `feature[i]` at
//! `threshold[i]`, sending samples with `x <= threshold` to
//! `children_left[i]` and the rest to `children_right[i]`. Leaves have both
//! children set to [`TREE_LEAF`] and carry per-class weights in `value[i]`.

use crate::classifier::{ModelKind, ProbabilisticClassifier};
use crate::numeric;
use probrank_core::{Error, FeatureSchema, FeatureVector, Result};
use serde::{Deserialize, Serialize};

/// Child marker for leaf nodes
pub const TREE_LEAF: i64 = -1;

/// A single decision tree in flat array form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    value: Vec<Vec<f64>>,
}

impl DecisionTree {
    /// Assemble a tree from its node arrays; see [`DecisionTree::validate`]
    pub fn new(
        children_left: Vec<i64>,
        children_right: Vec<i64>,
        feature: Vec<i64>,
        threshold: Vec<f64>,
        value: Vec<Vec<f64>>,
    ) -> Self {
        Self {
            children_left,
            children_right,
            feature,
            threshold,
            value,
        }
    }

    /// A tree with a single leaf
    pub fn leaf(value: Vec<f64>) -> Self {
        Self::new(vec![TREE_LEAF], vec![TREE_LEAF], vec![-2], vec![-2.0], vec![value])
    }

    /// A depth-one tree: `x[feature] <= threshold` picks `left`, else `right`
    pub fn stump(feature: usize, threshold: f64, left: Vec<f64>, right: Vec<f64>) -> Self {
        let n_classes = left.len();
        Self::new(
            vec![1, TREE_LEAF, TREE_LEAF],
            vec![2, TREE_LEAF, TREE_LEAF],
            vec![feature as i64, -2, -2],
            vec![threshold, -2.0, -2.0],
            vec![vec![0.0; n_classes], left, right],
        )
    }

    /// Number of nodes
    pub fn n_nodes(&self) -> usize {
        self.children_left.len()
    }

    fn is_leaf(&self, node: usize) -> bool {
        self.children_left[node] == TREE_LEAF
    }

    /// Check structural invariants.
    ///
    /// Every child index must point past its parent, which rules out cycles
    /// and guarantees traversal terminates.
    pub fn validate(&self, n_features: usize, n_classes: usize) -> Result<()> {
        let n_nodes = self.n_nodes();
        if n_nodes == 0 {
            return Err(Error::config("tree has no nodes"));
        }
        if self.children_right.len() != n_nodes
            || self.feature.len() != n_nodes
            || self.threshold.len() != n_nodes
            || self.value.len() != n_nodes
        {
            return Err(Error::config(format!(
                "tree node arrays disagree in length (children_left={}, children_right={}, feature={}, threshold={}, value={})",
                n_nodes,
                self.children_right.len(),
                self.feature.len(),
                self.threshold.len(),
                self.value.len()
            )));
        }

        for node in 0..n_nodes {
            let left = self.children_left[node];
            let right = self.children_right[node];

            if left == TREE_LEAF || right == TREE_LEAF {
                if left != right {
                    return Err(Error::config(format!(
                        "node {} has only one child",
                        node
                    )));
                }
                let weights = &self.value[node];
                if weights.len() != n_classes {
                    return Err(Error::config(format!(
                        "leaf {} has {} class weights, expected {}",
                        node,
                        weights.len(),
                        n_classes
                    )));
                }
                if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                    return Err(Error::config(format!(
                        "leaf {} has negative or non-finite class weights",
                        node
                    )));
                }
                if weights.iter().sum::<f64>() <= 0.0 {
                    return Err(Error::config(format!("leaf {} has zero total weight", node)));
                }
                continue;
            }

            for child in [left, right] {
                if child <= node as i64 || child >= n_nodes as i64 {
                    return Err(Error::config(format!(
                        "node {} has out-of-order child {}",
                        node, child
                    )));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature >= n_features as i64 {
                return Err(Error::config(format!(
                    "node {} splits on feature {} but the model has {} features",
                    node, feature, n_features
                )));
            }
            if !self.threshold[node].is_finite() {
                return Err(Error::config(format!("node {} has a non-finite threshold", node)));
            }
        }

        Ok(())
    }

    fn leaf_index(&self, x: &[f32]) -> usize {
        let mut node = 0;
        while !self.is_leaf(node) {
            let sample = f64::from(x[self.feature[node] as usize]);
            node = if sample <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        node
    }

    /// Normalized class distribution of the leaf `x` lands in.
    ///
    /// The tree must have passed [`DecisionTree::validate`].
    pub fn predict_proba(&self, x: &[f32]) -> Vec<f64> {
        let weights = &self.value[self.leaf_index(x)];
        let total: f64 = weights.iter().sum();
        weights.iter().map(|w| w / total).collect()
    }
}

/// Average of per-tree leaf distributions
#[derive(Debug, Clone)]
pub struct RandomForest {
    name: String,
    schema: FeatureSchema,
    n_classes: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Create a forest, validating every tree against the schema and class count
    pub fn new(
        name: impl Into<String>,
        schema: FeatureSchema,
        n_classes: usize,
        trees: Vec<DecisionTree>,
    ) -> Result<Self> {
        validate_trees(&trees, schema.len(), n_classes)?;

        Ok(Self {
            name: name.into(),
            schema,
            n_classes,
            trees,
        })
    }

    /// Class distribution for an already-encoded sample
    pub fn predict_encoded(&self, x: &[f64]) -> Result<Vec<f64>> {
        let x = to_single_precision(x, &self.schema)?;

        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.predict_proba(&x)) {
                *acc += p;
            }
        }

        let n_trees = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        Ok(proba)
    }
}

impl ProbabilisticClassifier for RandomForest {
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
        ModelKind::RandomForest
    }
}

pub(crate) fn validate_trees(trees: &[DecisionTree], n_features: usize, n_classes: usize) -> Result<()> {
    if n_classes < 2 {
        return Err(Error::config(format!(
            "a classifier needs at least 2 classes, got {}",
            n_classes
        )));
    }
    if trees.is_empty() {
        return Err(Error::config("forest has no trees"));
    }

    for (i, tree) in trees.iter().enumerate() {
        tree.validate(n_features, n_classes)
            .map_err(|e| Error::config(format!("tree {}: {}", i, bare_message(e))))?;
    }
    Ok(())
}

fn bare_message(err: Error) -> String {
    match err {
        Error::Config(msg) => msg,
        other => other.to_string(),
    }
}

/// Trees compare samples at single precision, the precision their
/// thresholds were fitted against.
pub(crate) fn to_single_precision(x: &[f64], schema: &FeatureSchema) -> Result<Vec<f32>> {
    x.iter()
        .zip(schema.iter())
        .map(|(v, name)| {
            let narrowed = *v as f32;
            if narrowed.is_finite() {
                Ok(narrowed)
            } else {
                Err(Error::classifier(format!(
                    "input contains a value too large for float32 (feature '{}')",
                    name
                )))
            }
        })
        .collect()
}
