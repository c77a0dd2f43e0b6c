//! XGBoost JSON model loading and single-row inference.
//!
//! The artifact is the standard XGBoost (>= 1.0) JSON export: each tree is a
//! set of parallel node arrays (children, split features, thresholds), with
//! leaf values stored in `split_conditions` at leaf positions. The artifact's
//! training history and hyperparameters are irrelevant here; the model is
//! loaded once at startup and treated as a black-box feature-vector →
//! probability function, shared read-only across request handlers.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
struct ModelDoc {
    learner: LearnerDoc,
}

// XGBoost serializes most learner params as strings ("77", "5E-1") and some
// as arrays, so the learner is unpacked by hand from Value rather than
// derived field-by-field.
#[derive(Debug, Deserialize)]
struct LearnerDoc {
    gradient_booster: Value,
    objective: Value,
    learner_model_param: Value,
}

#[derive(Debug, Deserialize)]
struct TreeModelDoc {
    trees: Vec<TreeDoc>,
}

/// One tree in XGBoost's parallel-array layout. Node `i` is a leaf when
/// `left_children[i] == -1`; leaves keep their output value in
/// `split_conditions[i]`.
#[derive(Debug, Deserialize)]
struct TreeDoc {
    left_children: Vec<i32>,
    right_children: Vec<i32>,
    split_indices: Vec<u32>,
    split_conditions: Vec<f32>,
    default_left: Vec<i32>,
}

#[derive(Debug)]
struct Tree {
    left: Vec<i32>,
    right: Vec<i32>,
    split_index: Vec<u32>,
    split_value: Vec<f32>,
    default_left: Vec<bool>,
}

impl Tree {
    /// Walk from the root to a leaf for one feature vector. Missing values
    /// (NaN) follow the recorded default direction.
    fn score(&self, features: &[f32]) -> f32 {
        let mut node = 0usize;
        loop {
            let left = self.left[node];
            if left < 0 {
                return self.split_value[node];
            }
            let value = features[self.split_index[node] as usize];
            node = if value.is_nan() {
                if self.default_left[node] {
                    left as usize
                } else {
                    self.right[node] as usize
                }
            } else if value < self.split_value[node] {
                left as usize
            } else {
                self.right[node] as usize
            };
        }
    }
}

/// A loaded gradient-boosted-tree binary classifier.
#[derive(Debug)]
pub struct GbtModel {
    trees: Vec<Tree>,
    base_margin: f64,
    num_features: usize,
}

impl GbtModel {
    /// Load and validate a model artifact from disk. Any failure here is
    /// fatal at startup; the service never retrains or mutates the model.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open model artifact {}", path.display()))?;
        let doc: Value = serde_json::from_reader(BufReader::new(file))
            .context("Model artifact is not valid JSON")?;
        Self::from_value(doc)
    }

    /// Build a model from an already-parsed artifact document.
    pub fn from_value(doc: Value) -> Result<Self> {
        let doc: ModelDoc =
            serde_json::from_value(doc).context("Model artifact has an unexpected layout")?;

        let objective = doc
            .learner
            .objective
            .get("name")
            .and_then(Value::as_str)
            .context("Model is missing its objective name")?;
        if !matches!(objective, "binary:logistic" | "reg:logistic") {
            bail!(
                "unsupported objective '{}': a binary logistic classifier is required",
                objective
            );
        }

        let booster = doc
            .learner
            .gradient_booster
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("");
        if booster != "gbtree" {
            bail!("unsupported booster '{}': only gbtree models are supported", booster);
        }
        let tree_model: TreeModelDoc = serde_json::from_value(
            doc.learner
                .gradient_booster
                .get("model")
                .cloned()
                .context("gbtree booster is missing its tree model")?,
        )
        .context("Failed to parse tree arrays")?;
        if tree_model.trees.is_empty() {
            bail!("model contains no trees");
        }

        let params = &doc.learner.learner_model_param;
        let num_features = param_f64(params, "num_feature")? as usize;
        let base_score = param_f64(params, "base_score")?;

        // XGBoost stores base_score in probability space; the accumulator
        // works in margin space, so apply the logit transform up front.
        let p = base_score.clamp(1e-7, 1.0 - 1e-7);
        let base_margin = (p / (1.0 - p)).ln();

        let mut trees = Vec::with_capacity(tree_model.trees.len());
        for (tree_idx, t) in tree_model.trees.into_iter().enumerate() {
            let n = t.left_children.len();
            if n == 0 {
                bail!("tree {} has no nodes", tree_idx);
            }
            if t.right_children.len() != n
                || t.split_indices.len() != n
                || t.split_conditions.len() != n
                || t.default_left.len() != n
            {
                bail!("tree {} has inconsistent node arrays", tree_idx);
            }
            for node in 0..n {
                let left = t.left_children[node];
                let right = t.right_children[node];
                if left < 0 {
                    continue; // leaf
                }
                if left as usize >= n || right < 0 || right as usize >= n {
                    bail!("tree {} node {} references out-of-range children", tree_idx, node);
                }
                if t.split_indices[node] as usize >= num_features {
                    bail!(
                        "tree {} node {} splits on feature {} but the model declares {} features",
                        tree_idx,
                        node,
                        t.split_indices[node],
                        num_features
                    );
                }
            }
            trees.push(Tree {
                left: t.left_children,
                right: t.right_children,
                split_index: t.split_indices,
                split_value: t.split_conditions,
                default_left: t.default_left.into_iter().map(|v| v != 0).collect(),
            });
        }

        Ok(GbtModel {
            trees,
            base_margin,
            num_features,
        })
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Estimate the probability that team1 wins, given the differenced
    /// feature vector. The vector must match the model's trained
    /// dimensionality exactly.
    pub fn predict(&self, features: &[f32]) -> Result<f64, ApiError> {
        if features.len() != self.num_features {
            return Err(ApiError::Inference(format!(
                "feature vector has {} values but the model expects {}",
                features.len(),
                self.num_features
            )));
        }
        let mut margin = self.base_margin;
        for tree in &self.trees {
            margin += tree.score(features) as f64;
        }
        Ok(sigmoid(margin))
    }
}

/// Extract a numeric learner param that XGBoost may have serialized as a
/// number, a stringified number ("5E-1"), a bracketed string ("[5E-1]"), or
/// a single-element array.
fn param_f64(params: &Value, key: &str) -> Result<f64> {
    let value = params
        .get(key)
        .with_context(|| format!("Model is missing learner param '{}'", key))?;
    let scalar = match value {
        Value::Array(arr) => arr.first().cloned().unwrap_or(Value::Null),
        other => other.clone(),
    };
    match scalar {
        Value::Number(n) => n.as_f64().context("learner param is not a finite number"),
        Value::String(s) => {
            let t = s.trim().trim_start_matches('[').trim_end_matches(']');
            t.parse::<f64>()
                .with_context(|| format!("Cannot parse learner param '{}' from '{}'", key, s))
        }
        _ => bail!("learner param '{}' has an unsupported type", key),
    }
}

/// Standard logistic sigmoid function.
fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    /// Two shallow trees over 3 features, base_score 0.5 (zero margin).
    /// Tree 0 splits on feature 0 at 0.0 (default left), leaves -0.4 / 0.6.
    /// Tree 1 splits on feature 2 at 1.5 (default right), leaves 0.1 / -0.2.
    fn artifact() -> serde_json::Value {
        json!({
            "version": [2, 0, 0],
            "learner": {
                "feature_names": [],
                "feature_types": [],
                "gradient_booster": {
                    "name": "gbtree",
                    "model": {
                        "gbtree_model_param": {"num_trees": "2", "num_parallel_tree": "1"},
                        "tree_info": [0, 0],
                        "trees": [
                            {
                                "left_children": [1, -1, -1],
                                "right_children": [2, -1, -1],
                                "split_indices": [0, 0, 0],
                                "split_conditions": [0.0, -0.4, 0.6],
                                "default_left": [1, 0, 0],
                                "base_weights": [0.0, -0.4, 0.6]
                            },
                            {
                                "left_children": [1, -1, -1],
                                "right_children": [2, -1, -1],
                                "split_indices": [2, 0, 0],
                                "split_conditions": [1.5, 0.1, -0.2],
                                "default_left": [0, 0, 0],
                                "base_weights": [0.0, 0.1, -0.2]
                            }
                        ]
                    }
                },
                "objective": {"name": "binary:logistic", "reg_loss_param": {"scale_pos_weight": "1"}},
                "learner_model_param": {
                    "base_score": "5E-1",
                    "num_class": "0",
                    "num_feature": "3",
                    "num_target": "1"
                }
            }
        })
    }

    #[test]
    fn walks_both_trees_and_applies_sigmoid() {
        let model = GbtModel::from_value(artifact()).unwrap();
        assert_eq!(model.num_trees(), 2);
        assert_eq!(model.num_features(), 3);

        // f0 < 0 → -0.4; f2 < 1.5 → 0.1; margin = -0.3
        let p = model.predict(&[-1.0, 0.0, 0.0]).unwrap();
        assert_relative_eq!(p, sigmoid(-0.3), epsilon = 1e-6);

        // f0 >= 0 → 0.6; f2 >= 1.5 → -0.2; margin = 0.4
        let p = model.predict(&[1.0, 0.0, 2.0]).unwrap();
        assert_relative_eq!(p, sigmoid(0.4), epsilon = 1e-6);
    }

    #[test]
    fn missing_values_follow_default_direction() {
        let model = GbtModel::from_value(artifact()).unwrap();

        // Tree 0 defaults left (-0.4); f2 = 2.0 goes right (-0.2)
        let p = model.predict(&[f32::NAN, 0.0, 2.0]).unwrap();
        assert_relative_eq!(p, sigmoid(-0.6), epsilon = 1e-6);

        // Tree 1 defaults right (-0.2); f0 = 1.0 goes right (0.6)
        let p = model.predict(&[1.0, 0.0, f32::NAN]).unwrap();
        assert_relative_eq!(p, sigmoid(0.4), epsilon = 1e-6);
    }

    #[test]
    fn base_score_enters_in_margin_space() {
        let mut doc = artifact();
        doc["learner"]["learner_model_param"]["base_score"] = json!(0.75);
        // Replace both trees with single-leaf zero-output trees
        doc["learner"]["gradient_booster"]["model"]["trees"] = json!([{
            "left_children": [-1],
            "right_children": [-1],
            "split_indices": [0],
            "split_conditions": [0.0],
            "default_left": [0],
            "base_weights": [0.0]
        }]);
        let model = GbtModel::from_value(doc).unwrap();
        let p = model.predict(&[0.0, 0.0, 0.0]).unwrap();
        assert_relative_eq!(p, 0.75, epsilon = 1e-6);
    }

    #[test]
    fn dimension_mismatch_is_an_inference_error() {
        let model = GbtModel::from_value(artifact()).unwrap();
        let err = model.predict(&[0.0, 0.0]).unwrap_err();
        assert!(matches!(err, ApiError::Inference(_)));
        assert!(err.to_string().contains("expects 3"));
    }

    #[test]
    fn rejects_non_binary_objectives() {
        let mut doc = artifact();
        doc["learner"]["objective"] = json!({"name": "multi:softprob"});
        let err = GbtModel::from_value(doc).unwrap_err();
        assert!(err.to_string().contains("unsupported objective"));
    }

    #[test]
    fn rejects_non_tree_boosters() {
        let mut doc = artifact();
        doc["learner"]["gradient_booster"] = json!({
            "name": "gblinear",
            "model": {"weights": [0.1, 0.2, 0.3]}
        });
        let err = GbtModel::from_value(doc).unwrap_err();
        assert!(err.to_string().contains("unsupported booster"));
    }

    #[test]
    fn rejects_out_of_range_split_features() {
        let mut doc = artifact();
        doc["learner"]["gradient_booster"]["model"]["trees"][0]["split_indices"] = json!([7, 0, 0]);
        assert!(GbtModel::from_value(doc).is_err());
    }

    #[test]
    fn parses_bracketed_base_score() {
        let params = json!({"base_score": "[5E-1]"});
        assert_relative_eq!(param_f64(&params, "base_score").unwrap(), 0.5);
    }
}
