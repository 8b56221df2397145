//! Optional statistical classifier.
//!
//! The adapter owns at most one [`Classifier`] and turns every failure
//! (missing artifact, bad artifact, inference error) into "no verdict".
//! Detection then falls back to the heuristic score alone.

pub mod fixed;
pub mod forest;
#[cfg(feature = "onnx")]
pub mod onnx;

pub use fixed::FixedClassifier;
pub use forest::ForestClassifier;
#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ClassifierError, PhishSenseError};
use crate::features::FeatureSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Label {
    Legitimate,
    Phishing,
}

impl Label {
    /// Class index as the fusion formula uses it.
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Legitimate => 0.0,
            Self::Phishing => 1.0,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Legitimate => 0,
            Self::Phishing => 1,
        }
    }
}

impl TryFrom<i64> for Label {
    type Error = ClassifierError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Legitimate),
            1 => Ok(Self::Phishing),
            other => Err(ClassifierError::Format(format!("unexpected class label {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierVerdict {
    pub label: Label,
    /// Probability of the more likely class, in `[0, 1]`.
    pub confidence: f64,
}

/// A trained binary classifier over the canonical feature vector.
///
/// Implementations are shared across concurrent detections.
pub trait Classifier: Send + Sync {
    /// Human-readable backend name (e.g. "forest", "onnx")
    fn name(&self) -> &str;

    fn predict(&self, vector: &[f64]) -> Result<Label, ClassifierError>;

    /// `[p(legitimate), p(phishing)]`
    fn predict_probability(&self, vector: &[f64]) -> Result<[f64; 2], ClassifierError>;

    /// Label and probabilities together. Backends whose inference yields
    /// both at once override this to run a single pass.
    fn classify(&self, vector: &[f64]) -> Result<(Label, [f64; 2]), ClassifierError> {
        Ok((self.predict(vector)?, self.predict_probability(vector)?))
    }
}

#[derive(Clone, Default)]
pub struct ClassifierAdapter {
    inner: Option<Arc<dyn Classifier>>,
}

impl ClassifierAdapter {
    /// Heuristic-only scoring.
    pub fn absent() -> Self {
        Self { inner: None }
    }

    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            inner: Some(classifier),
        }
    }

    /// Load the artifact at `path`, choosing the backend by extension
    /// (`.onnx`, anything else is a JSON forest).
    ///
    /// A missing or broken artifact yields an absent adapter. Only a path
    /// whose existence cannot be determined is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, PhishSenseError> {
        let Some(path) = path else {
            tracing::debug!("no classifier artifact configured");
            return Ok(Self::absent());
        };

        let exists = path
            .try_exists()
            .map_err(|source| PhishSenseError::ClassifierPath {
                path: path.to_path_buf(),
                source,
            })?;
        if !exists {
            tracing::debug!(path = %path.display(), "classifier artifact not found; heuristic-only");
            return Ok(Self::absent());
        }

        match load_artifact(path) {
            Ok(classifier) => {
                tracing::info!(
                    path = %path.display(),
                    backend = classifier.name(),
                    "classifier loaded"
                );
                Ok(Self::new(classifier))
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "classifier unavailable: {e}");
                Ok(Self::absent())
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.is_some()
    }

    pub fn name(&self) -> Option<&str> {
        self.inner.as_deref().map(Classifier::name)
    }

    /// Verdict for `features`, or `None` when no classifier is loaded or
    /// inference fails.
    pub fn predict(&self, features: &FeatureSet) -> Option<ClassifierVerdict> {
        let classifier = self.inner.as_deref()?;
        match run(classifier, &features.to_vector()) {
            Ok(verdict) => {
                tracing::debug!(
                    backend = classifier.name(),
                    label = %verdict.label,
                    confidence = verdict.confidence,
                    "classifier verdict"
                );
                Some(verdict)
            }
            Err(e) => {
                tracing::warn!(backend = classifier.name(), "classifier inference failed: {e}");
                None
            }
        }
    }
}

impl std::fmt::Debug for ClassifierAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierAdapter")
            .field("backend", &self.name())
            .finish()
    }
}

fn run(classifier: &dyn Classifier, vector: &[f64]) -> Result<ClassifierVerdict, ClassifierError> {
    let (label, probabilities) = classifier.classify(vector)?;
    if probabilities.iter().any(|p| !p.is_finite() || *p < 0.0) {
        return Err(ClassifierError::Inference(format!(
            "invalid probabilities {probabilities:?}"
        )));
    }
    let confidence = probabilities[0].max(probabilities[1]).clamp(0.0, 1.0);
    Ok(ClassifierVerdict { label, confidence })
}

fn load_artifact(path: &Path) -> Result<Arc<dyn Classifier>, ClassifierError> {
    let is_onnx = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("onnx"));

    if is_onnx {
        #[cfg(feature = "onnx")]
        {
            return Ok(Arc::new(OnnxClassifier::load(path)?));
        }
        #[cfg(not(feature = "onnx"))]
        {
            return Err(ClassifierError::Unsupported("onnx"));
        }
    }
    Ok(Arc::new(ForestClassifier::load(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Feature;
    use std::sync::atomic::Ordering;

    fn adapter(classifier: FixedClassifier) -> ClassifierAdapter {
        ClassifierAdapter::new(Arc::new(classifier))
    }

    #[test]
    fn absent_adapter_gives_no_verdict() {
        let adapter = ClassifierAdapter::absent();
        assert!(!adapter.is_loaded());
        assert!(adapter.predict(&FeatureSet::zeroed()).is_none());
    }

    #[test]
    fn confidence_is_max_probability() {
        let verdict = adapter(FixedClassifier::new(Label::Phishing, [0.15, 0.85]))
            .predict(&FeatureSet::zeroed())
            .unwrap();
        assert_eq!(verdict.label, Label::Phishing);
        assert!((verdict.confidence - 0.85).abs() < 1e-12);

        let verdict = adapter(FixedClassifier::new(Label::Legitimate, [0.6, 0.4]))
            .predict(&FeatureSet::zeroed())
            .unwrap();
        assert!((verdict.confidence - 0.6).abs() < 1e-12);
    }

    #[test]
    fn inference_failure_is_absorbed() {
        let adapter = adapter(FixedClassifier::failing("session crashed"));
        assert!(adapter.is_loaded());
        assert!(adapter.predict(&FeatureSet::zeroed()).is_none());
    }

    #[test]
    fn non_finite_probabilities_are_rejected() {
        let adapter = adapter(FixedClassifier::new(Label::Phishing, [f64::NAN, 0.9]));
        assert!(adapter.predict(&FeatureSet::zeroed()).is_none());
    }

    #[test]
    fn receives_canonical_vector() {
        let fixed = FixedClassifier::new(Label::Legitimate, [1.0, 0.0]);
        let seen = fixed.last_input();
        let adapter = adapter(fixed);
        let features = FeatureSet::from_pairs([(Feature::UrlLength, 33.0), (Feature::NumHashes, 4.0)]);
        adapter.predict(&features).unwrap();
        let vector = seen.lock().unwrap().clone().unwrap();
        assert_eq!(vector.len(), crate::features::CANONICAL_FEATURE_COUNT);
        assert!((vector[0] - 33.0).abs() < f64::EPSILON);
    }

    #[test]
    fn one_inference_per_verdict() {
        let fixed = FixedClassifier::confident(Label::Phishing, 0.9);
        let calls = fixed.calls();
        let adapter = adapter(fixed);
        adapter.predict(&FeatureSet::zeroed()).unwrap();
        adapter.predict(&FeatureSet::zeroed()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn labels_from_class_indices() {
        assert_eq!(Label::try_from(0).unwrap(), Label::Legitimate);
        assert_eq!(Label::try_from(1).unwrap(), Label::Phishing);
        assert!(Label::try_from(2).is_err());
        assert_eq!(Label::Phishing.to_string(), "phishing");
    }

    #[test]
    fn load_without_path_is_absent() {
        assert!(!ClassifierAdapter::load(None).unwrap().is_loaded());
    }

    #[test]
    fn load_missing_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = ClassifierAdapter::load(Some(&dir.path().join("model.json"))).unwrap();
        assert!(!adapter.is_loaded());
    }

    #[test]
    fn load_garbage_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(!ClassifierAdapter::load(Some(&path)).unwrap().is_loaded());
    }

    #[cfg(not(feature = "onnx"))]
    #[test]
    fn onnx_without_feature_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        std::fs::write(&path, [0_u8; 16]).unwrap();
        assert!(!ClassifierAdapter::load(Some(&path)).unwrap().is_loaded());
    }
}
