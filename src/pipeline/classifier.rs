//! Classifier adapter: scaled feature vector -> churn probability
//!
//! Two model families can be loaded from the JSON model artifact:
//!
//! - `logistic`: `sigmoid(intercept + w . x)`
//! - `tree_ensemble`: gradient boosted regression trees with a logistic link,
//!   following the XGBoost conventions (`x < threshold` goes to the `yes`
//!   child, `base_score` is a probability).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error::ArtifactLoadError;

/// Failures raised by a classifier on a single input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifierError {
    #[error("feature vector has {actual} values, model expects {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("feature {index} is not a finite number")]
    NonFiniteInput { index: usize },

    #[error("model produced {0}, which is not a probability")]
    InvalidOutput(f64),
}

/// A trained binary classifier.
///
/// Implementations must be pure: the same input always yields the same
/// probability.
pub trait Classifier: Send + Sync {
    /// Width of the feature vector the model was trained on
    fn n_features(&self) -> usize;

    /// Probability of the positive (churn) class
    fn predict_proba(&self, features: &[f64]) -> Result<f64, ClassifierError>;

    /// Short human-readable description
    fn describe(&self) -> String;
}

/// Logistic function, stable for large magnitudes
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn check_input(features: &[f64], expected: usize) -> Result<(), ClassifierError> {
    if features.len() != expected {
        return Err(ClassifierError::ShapeMismatch {
            expected,
            actual: features.len(),
        });
    }
    if let Some(index) = features.iter().position(|v| !v.is_finite()) {
        return Err(ClassifierError::NonFiniteInput { index });
    }
    Ok(())
}

fn check_output(p: f64) -> Result<f64, ClassifierError> {
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(ClassifierError::InvalidOutput(p))
    }
}

/// Model artifact as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Logistic(LogisticModel),
    TreeEnsemble(TreeEnsemble),
}

impl ModelArtifact {
    /// Validate the artifact and turn it into a classifier
    pub fn into_classifier(self) -> Result<Box<dyn Classifier>, ArtifactLoadError> {
        match self {
            ModelArtifact::Logistic(model) => {
                model.validate()?;
                Ok(Box::new(model))
            }
            ModelArtifact::TreeEnsemble(model) => {
                model.validate()?;
                Ok(Box::new(model))
            }
        }
    }
}

/// Linear model with a logistic link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LogisticModel {
    fn validate(&self) -> Result<(), ArtifactLoadError> {
        if self.coefficients.is_empty() {
            return Err(ArtifactLoadError::integrity("model", "logistic model has no coefficients"));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ArtifactLoadError::integrity(
                "model",
                "logistic model has non-finite parameters",
            ));
        }
        Ok(())
    }
}

impl Classifier for LogisticModel {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict_proba(&self, features: &[f64]) -> Result<f64, ClassifierError> {
        check_input(features, self.coefficients.len())?;
        let z = self
            .coefficients
            .iter()
            .zip(features)
            .fold(self.intercept, |acc, (w, x)| acc + w * x);
        check_output(sigmoid(z))
    }

    fn describe(&self) -> String {
        format!("logistic regression ({} features)", self.coefficients.len())
    }
}

/// A node of a regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        yes: usize,
        no: usize,
    },
    Leaf {
        leaf: f64,
    },
}

/// A single regression tree; node 0 is the root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    fn validate(&self, tree_idx: usize, n_features: usize) -> Result<(), ArtifactLoadError> {
        if self.nodes.is_empty() {
            return Err(ArtifactLoadError::integrity(
                "model",
                format!("tree {} has no nodes", tree_idx),
            ));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            let bad = match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    yes,
                    no,
                } => {
                    *feature >= n_features
                        || !threshold.is_finite()
                        || *yes <= idx
                        || *no <= idx
                        || *yes >= self.nodes.len()
                        || *no >= self.nodes.len()
                }
                TreeNode::Leaf { leaf } => !leaf.is_finite(),
            };
            if bad {
                return Err(ArtifactLoadError::integrity(
                    "model",
                    format!("tree {} node {} is malformed", tree_idx, idx),
                ));
            }
        }
        Ok(())
    }

    /// Leaf value reached by `features`.
    ///
    /// Children always have a larger index than their parent, so the walk
    /// terminates.
    fn leaf_value(&self, features: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { leaf } => return *leaf,
                TreeNode::Split {
                    feature,
                    threshold,
                    yes,
                    no,
                } => {
                    idx = if features[*feature] < *threshold { *yes } else { *no };
                }
            }
        }
    }
}

/// Gradient boosted trees with a logistic link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub n_features: usize,
    #[serde(default = "default_base_score")]
    pub base_score: f64,
    pub trees: Vec<Tree>,
}

fn default_base_score() -> f64 {
    0.5
}

impl TreeEnsemble {
    fn validate(&self) -> Result<(), ArtifactLoadError> {
        if self.n_features == 0 {
            return Err(ArtifactLoadError::integrity("model", "tree ensemble has zero features"));
        }
        if !(self.base_score > 0.0 && self.base_score < 1.0) {
            return Err(ArtifactLoadError::integrity(
                "model",
                format!("base_score {} must be in (0, 1)", self.base_score),
            ));
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(idx, self.n_features)?;
        }
        Ok(())
    }

    fn base_margin(&self) -> f64 {
        (self.base_score / (1.0 - self.base_score)).ln()
    }

    /// Raw margin (log-odds) before the logistic link
    pub fn margin(&self, features: &[f64]) -> f64 {
        self.trees
            .iter()
            .fold(self.base_margin(), |acc, tree| acc + tree.leaf_value(features))
    }
}

impl Classifier for TreeEnsemble {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, features: &[f64]) -> Result<f64, ClassifierError> {
        check_input(features, self.n_features)?;
        check_output(sigmoid(self.margin(features)))
    }

    fn describe(&self) -> String {
        format!(
            "gradient boosted trees ({} trees, {} features)",
            self.trees.len(),
            self.n_features
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f64, yes: f64, no: f64) -> Tree {
        Tree {
            nodes: vec![
                TreeNode::Split {
                    feature,
                    threshold,
                    yes: 1,
                    no: 2,
                },
                TreeNode::Leaf { leaf: yes },
                TreeNode::Leaf { leaf: no },
            ],
        }
    }

    #[test]
    fn test_sigmoid() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(800.0) <= 1.0);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!((sigmoid(2.0) + sigmoid(-2.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_logistic_prediction() {
        let model = LogisticModel {
            intercept: 0.0,
            coefficients: vec![1.0, -1.0],
        };
        assert_eq!(model.predict_proba(&[2.0, 2.0]).unwrap(), 0.5);
        assert!(model.predict_proba(&[3.0, 0.0]).unwrap() > 0.9);
    }

    #[test]
    fn test_logistic_shape_mismatch() {
        let model = LogisticModel {
            intercept: 0.0,
            coefficients: vec![1.0, -1.0],
        };
        let err = model.predict_proba(&[1.0]).unwrap_err();
        assert_eq!(
            err,
            ClassifierError::ShapeMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_non_finite_input() {
        let model = LogisticModel {
            intercept: 0.0,
            coefficients: vec![1.0, 1.0],
        };
        let err = model.predict_proba(&[1.0, f64::INFINITY]).unwrap_err();
        assert_eq!(err, ClassifierError::NonFiniteInput { index: 1 });
    }

    #[test]
    fn test_tree_ensemble_margin() {
        let model = TreeEnsemble {
            n_features: 2,
            base_score: 0.5,
            trees: vec![stump(0, 10.0, -1.0, 1.0), stump(1, 0.5, 0.25, -0.25)],
        };
        model.validate().unwrap();

        // x0 < 10 -> -1.0, x1 >= 0.5 -> -0.25
        assert!((model.margin(&[5.0, 1.0]) + 1.25).abs() < 1e-12);
        // Split goes to `no` on equality
        assert!((model.margin(&[10.0, 0.0]) - 1.25).abs() < 1e-12);

        let p = model.predict_proba(&[10.0, 0.0]).unwrap();
        assert!((p - sigmoid(1.25)).abs() < 1e-12);
    }

    #[test]
    fn test_tree_rejects_backward_edge() {
        let model = TreeEnsemble {
            n_features: 1,
            base_score: 0.5,
            trees: vec![Tree {
                nodes: vec![
                    TreeNode::Split {
                        feature: 0,
                        threshold: 1.0,
                        yes: 1,
                        no: 0,
                    },
                    TreeNode::Leaf { leaf: 0.1 },
                ],
            }],
        };
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_tree_rejects_unknown_feature() {
        let model = TreeEnsemble {
            n_features: 1,
            base_score: 0.5,
            trees: vec![stump(3, 1.0, 0.0, 0.0)],
        };
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_artifact_deserialization() {
        let json = r#"{
            "kind": "tree_ensemble",
            "n_features": 1,
            "base_score": 0.3,
            "trees": [{"nodes": [
                {"feature": 0, "threshold": 2.5, "yes": 1, "no": 2},
                {"leaf": -0.4},
                {"leaf": 0.6}
            ]}]
        }"#;
        let artifact: ModelArtifact = serde_json::from_str(json).unwrap();
        let classifier = artifact.into_classifier().unwrap();
        assert_eq!(classifier.n_features(), 1);
        assert!(classifier.describe().contains("1 trees"));

        let p = classifier.predict_proba(&[3.0]).unwrap();
        let expected = sigmoid((0.3f64 / 0.7).ln() + 0.6);
        assert!((p - expected).abs() < 1e-12);
    }

    #[test]
    fn test_logistic_artifact_rejects_empty() {
        let artifact: ModelArtifact =
            serde_json::from_str(r#"{"kind": "logistic", "intercept": 0.0, "coefficients": []}"#)
                .unwrap();
        assert!(artifact.into_classifier().is_err());
    }
}
