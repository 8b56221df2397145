//! Decision-forest classifier loaded from a JSON export.
//!
//! Artifact layout:
//!
//! ```json
//! {
//!   "schema_version": 1,
//!   "feature_names": ["url_length", "..."],
//!   "trees": [
//!     { "nodes": [
//!         { "feature": 16, "threshold": 0.5, "left": 1, "right": 2 },
//!         { "value": [120.0, 4.0] },
//!         { "value": [3.0, 88.0] }
//!     ] }
//!   ]
//! }
//! ```
//!
//! Node 0 is the root. A sample goes left when `x[feature] <= threshold`.
//! Leaves hold per-class sample counts (or probabilities); each tree's leaf
//! is normalized and the forest averages the trees. `schema_version` and
//! `feature_names` are optional; when present they must match this build's
//! [`FEATURE_SCHEMA_VERSION`] and canonical list.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::{Classifier, Label};
use crate::error::ClassifierError;
use crate::features::{CANONICAL_FEATURE_COUNT, FEATURE_SCHEMA_VERSION, Feature};

#[derive(Debug, Deserialize)]
struct ForestArtifact {
    #[serde(default)]
    schema_version: Option<u32>,
    #[serde(default)]
    feature_names: Option<Vec<String>>,
    trees: Vec<TreeArtifact>,
}

#[derive(Debug, Deserialize)]
struct TreeArtifact {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: [f64; 2],
    },
}

/// Validated tree: leaf distributions are already normalized.
#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn leaf(&self, x: &[f64]) -> [f64; 2] {
        let mut idx = 0;
        // Children always sit after their parent, so this walk terminates.
        loop {
            match &self.nodes[idx] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => idx = if x[*feature] <= *threshold { *left } else { *right },
                Node::Leaf { value } => return *value,
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ForestClassifier {
    trees: Vec<Tree>,
}

impl ForestClassifier {
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, ClassifierError> {
        let artifact: ForestArtifact = serde_json::from_str(contents)?;
        Self::from_artifact(artifact)
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    fn from_artifact(artifact: ForestArtifact) -> Result<Self, ClassifierError> {
        if let Some(version) = artifact.schema_version
            && version != FEATURE_SCHEMA_VERSION
        {
            return Err(ClassifierError::Format(format!(
                "artifact built for feature schema {version}, expected {FEATURE_SCHEMA_VERSION}"
            )));
        }
        if let Some(names) = &artifact.feature_names {
            check_feature_names(names)?;
        }
        if artifact.trees.is_empty() {
            return Err(ClassifierError::Format("forest has no trees".into()));
        }
        let trees = artifact
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, tree)| {
                validate_tree(tree).map_err(|e| ClassifierError::Format(format!("tree {i}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { trees })
    }

    fn check_input(vector: &[f64]) -> Result<(), ClassifierError> {
        if vector.len() != CANONICAL_FEATURE_COUNT {
            return Err(ClassifierError::Shape {
                expected: CANONICAL_FEATURE_COUNT,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

fn check_feature_names(names: &[String]) -> Result<(), ClassifierError> {
    let expected = Feature::canonical().map(Feature::name);
    if names.len() != CANONICAL_FEATURE_COUNT || !names.iter().map(String::as_str).eq(expected) {
        return Err(ClassifierError::Format(
            "feature_names do not match the canonical feature list".into(),
        ));
    }
    Ok(())
}

fn validate_tree(tree: TreeArtifact) -> Result<Tree, String> {
    let len = tree.nodes.len();
    if len == 0 {
        return Err("empty tree".into());
    }
    let mut nodes = Vec::with_capacity(len);
    for (idx, node) in tree.nodes.into_iter().enumerate() {
        match node {
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if feature >= CANONICAL_FEATURE_COUNT {
                    return Err(format!("node {idx}: feature index {feature} out of range"));
                }
                if !threshold.is_finite() {
                    return Err(format!("node {idx}: non-finite threshold"));
                }
                for child in [left, right] {
                    if child <= idx || child >= len {
                        return Err(format!("node {idx}: child {child} out of order or range"));
                    }
                }
                nodes.push(node);
            }
            Node::Leaf { value } => {
                if value.iter().any(|v| !v.is_finite() || *v < 0.0) {
                    return Err(format!("node {idx}: invalid leaf value"));
                }
                let total = value[0] + value[1];
                if total <= 0.0 {
                    return Err(format!("node {idx}: empty leaf"));
                }
                nodes.push(Node::Leaf {
                    value: [value[0] / total, value[1] / total],
                });
            }
        }
    }
    Ok(Tree { nodes })
}

impl Classifier for ForestClassifier {
    fn name(&self) -> &str {
        "forest"
    }

    /// Phishing only when it is strictly more likely; ties are legitimate.
    fn predict(&self, vector: &[f64]) -> Result<Label, ClassifierError> {
        let [legitimate, phishing] = self.predict_probability(vector)?;
        Ok(if phishing > legitimate {
            Label::Phishing
        } else {
            Label::Legitimate
        })
    }

    fn predict_probability(&self, vector: &[f64]) -> Result<[f64; 2], ClassifierError> {
        Self::check_input(vector)?;
        let mut sum = [0.0, 0.0];
        for tree in &self.trees {
            let leaf = tree.leaf(vector);
            sum[0] += leaf[0];
            sum[1] += leaf[1];
        }
        #[allow(clippy::cast_precision_loss)]
        let n = self.trees.len() as f64;
        Ok([sum[0] / n, sum[1] / n])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Splits on has_ip (index 16).
    const STUMP: &str = r#"{
        "trees": [
            { "nodes": [
                { "feature": 16, "threshold": 0.5, "left": 1, "right": 2 },
                { "value": [90.0, 10.0] },
                { "value": [5.0, 95.0] }
            ] },
            { "nodes": [ { "value": [1.0, 1.0] } ] }
        ]
    }"#;

    fn vector(has_ip: f64) -> Vec<f64> {
        let mut v = vec![0.0; CANONICAL_FEATURE_COUNT];
        v[Feature::HasIp.index()] = has_ip;
        v
    }

    #[test]
    fn averages_normalized_leaves() {
        let forest = ForestClassifier::from_json(STUMP).unwrap();
        assert_eq!(forest.tree_count(), 2);

        let p = forest.predict_probability(&vector(1.0)).unwrap();
        assert!((p[1] - (0.95 + 0.5) / 2.0).abs() < 1e-12);
        assert_eq!(forest.predict(&vector(1.0)).unwrap(), Label::Phishing);

        let p = forest.predict_probability(&vector(0.0)).unwrap();
        assert!((p[0] - (0.9 + 0.5) / 2.0).abs() < 1e-12);
        assert_eq!(forest.predict(&vector(0.0)).unwrap(), Label::Legitimate);
    }

    #[test]
    fn threshold_is_inclusive_left() {
        let forest = ForestClassifier::from_json(STUMP).unwrap();
        assert_eq!(forest.predict(&vector(0.5)).unwrap(), Label::Legitimate);
    }

    #[test]
    fn ties_are_legitimate() {
        let forest =
            ForestClassifier::from_json(r#"{"trees":[{"nodes":[{"value":[0.5,0.5]}]}]}"#).unwrap();
        assert_eq!(forest.predict(&vector(0.0)).unwrap(), Label::Legitimate);
    }

    #[test]
    fn wrong_vector_length_is_a_shape_error() {
        let forest = ForestClassifier::from_json(STUMP).unwrap();
        let err = forest.predict(&[0.0; 3]).unwrap_err();
        assert!(matches!(err, ClassifierError::Shape { expected: 29, actual: 3 }));
    }

    #[test]
    fn feature_names_must_match() {
        let names: Vec<&str> = Feature::canonical().map(Feature::name).collect();
        let ok = serde_json::json!({
            "feature_names": names,
            "trees": [{ "nodes": [{ "value": [1.0, 0.0] }] }]
        });
        assert!(ForestClassifier::from_json(&ok.to_string()).is_ok());

        let bad = serde_json::json!({
            "feature_names": ["url_length"],
            "trees": [{ "nodes": [{ "value": [1.0, 0.0] }] }]
        });
        assert!(ForestClassifier::from_json(&bad.to_string()).is_err());
    }

    #[test]
    fn schema_version_must_match() {
        let current = serde_json::json!({
            "schema_version": FEATURE_SCHEMA_VERSION,
            "trees": [{ "nodes": [{ "value": [1.0, 0.0] }] }]
        });
        assert!(ForestClassifier::from_json(&current.to_string()).is_ok());

        let stale = serde_json::json!({
            "schema_version": FEATURE_SCHEMA_VERSION + 1,
            "trees": [{ "nodes": [{ "value": [1.0, 0.0] }] }]
        });
        let err = ForestClassifier::from_json(&stale.to_string()).unwrap_err();
        assert!(err.to_string().contains("feature schema"));
    }

    #[test]
    fn structural_errors_are_rejected() {
        let cases = [
            r#"{"trees":[]}"#,
            r#"{"trees":[{"nodes":[]}]}"#,
            r#"{"trees":[{"nodes":[{"feature":99,"threshold":0.5,"left":1,"right":2},{"value":[1,0]},{"value":[0,1]}]}]}"#,
            r#"{"trees":[{"nodes":[{"feature":0,"threshold":0.5,"left":0,"right":1},{"value":[1,0]}]}]}"#,
            r#"{"trees":[{"nodes":[{"feature":0,"threshold":0.5,"left":1,"right":7},{"value":[1,0]}]}]}"#,
            r#"{"trees":[{"nodes":[{"value":[0,0]}]}]}"#,
            r#"{"trees":[{"nodes":[{"value":[-1,2]}]}]}"#,
            r#"{"trees":[{"nodes":[{"bogus":true}]}]}"#,
        ];
        for case in cases {
            assert!(ForestClassifier::from_json(case).is_err(), "accepted {case}");
        }
    }
}
