//! Random forest of CART trees.
//!
//! Trees use the flat array layout scikit-learn exposes on `tree_`:
//! node `i` is a leaf when `children_left[i] == -1`; otherwise the sample goes
//! left when `x[feature[i]] <= threshold[i]`. `value[i]` holds the class
//! weights `[negative, positive]` observed at the node. The `(n_nodes, 1, 2)`
//! shape sklearn reports for single-output classifiers is accepted as well.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{FeatureVector, FEATURE_COUNT};
use crate::ports::ClassifierError;

use super::ModelLoadError;

const LEAF: i64 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    #[serde(deserialize_with = "deserialize_node_values")]
    pub value: Vec<[f64; 2]>,
}

/// One entry of `tree_.value`, flattened or with the single-output axis kept.
#[derive(Deserialize)]
#[serde(untagged)]
enum NodeValue {
    Flat([f64; 2]),
    PerOutput([[f64; 2]; 1]),
}

fn deserialize_node_values<'de, D>(deserializer: D) -> Result<Vec<[f64; 2]>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<NodeValue>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .map(|v| match v {
            NodeValue::Flat(pair) | NodeValue::PerOutput([pair]) => pair,
        })
        .collect())
}

impl DecisionTree {
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.children_left.len()
    }

    fn validate(&self, tree_index: usize) -> Result<(), ModelLoadError> {
        let invalid = |msg: String| {
            ModelLoadError::InvalidParameters(format!("tree {tree_index}: {msg}"))
        };

        let n = self.n_nodes();
        if n == 0 {
            return Err(invalid("tree has no nodes".into()));
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err(invalid("node arrays have different lengths".into()));
        }

        for i in 0..n {
            let (left, right) = (self.children_left[i], self.children_right[i]);
            if left == LEAF || right == LEAF {
                if left != right {
                    return Err(invalid(format!("node {i} has exactly one child")));
                }
                let [neg, pos] = self.value[i];
                if !(neg.is_finite() && pos.is_finite()) || neg < 0.0 || pos < 0.0 {
                    return Err(invalid(format!("leaf {i} has invalid class weights")));
                }
                if neg + pos <= 0.0 {
                    return Err(invalid(format!("leaf {i} has zero total weight")));
                }
                continue;
            }

            // Children must point forward; this rules out cycles.
            for child in [left, right] {
                if child <= i as i64 || child >= n as i64 {
                    return Err(invalid(format!("node {i} has invalid child index {child}")));
                }
            }
            let f = self.feature[i];
            if f < 0 || f >= FEATURE_COUNT as i64 {
                return Err(invalid(format!("node {i} splits on unknown feature {f}")));
            }
            if !self.threshold[i].is_finite() {
                return Err(invalid(format!("node {i} has a non-finite threshold")));
            }
        }
        Ok(())
    }

    /// Normalized `[negative, positive]` distribution at the leaf `x` reaches.
    fn leaf_distribution(&self, x: &FeatureVector) -> Result<[f64; 2], ClassifierError> {
        let mut node = 0usize;
        for _ in 0..self.n_nodes() {
            let left = self.children_left[node];
            if left == LEAF {
                let [neg, pos] = self.value[node];
                let total = neg + pos;
                return Ok([neg / total, pos / total]);
            }
            let feature = self.feature[node] as usize;
            node = if x[feature] <= self.threshold[node] {
                left as usize
            } else {
                self.children_right[node] as usize
            };
        }
        Err(ClassifierError::Inference(
            "tree traversal did not reach a leaf".into(),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub(super) fn validate(&self) -> Result<(), ModelLoadError> {
        if self.trees.is_empty() {
            return Err(ModelLoadError::InvalidParameters(
                "random forest has no trees".into(),
            ));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(i)?;
        }
        Ok(())
    }

    /// Mean of the per-tree leaf distributions (soft voting).
    pub(super) fn predict_proba(&self, x: &FeatureVector) -> Result<[f64; 2], ClassifierError> {
        let mut sum = [0.0, 0.0];
        for tree in &self.trees {
            let [neg, pos] = tree.leaf_distribution(x)?;
            sum[0] += neg;
            sum[1] += pos;
        }
        let n = self.trees.len() as f64;
        Ok([sum[0] / n, sum[1] / n])
    }
}
