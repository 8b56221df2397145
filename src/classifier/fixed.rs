use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{Classifier, Label};
use crate::error::ClassifierError;

/// Classifier with canned answers, for tests and dry runs.
#[derive(Debug, Clone)]
pub struct FixedClassifier {
    outcome: Result<(Label, [f64; 2]), String>,
    last_input: Arc<Mutex<Option<Vec<f64>>>>,
    calls: Arc<AtomicUsize>,
}

impl FixedClassifier {
    pub fn new(label: Label, probabilities: [f64; 2]) -> Self {
        Self {
            outcome: Ok((label, probabilities)),
            last_input: Arc::default(),
            calls: Arc::default(),
        }
    }

    /// `label` with the given confidence assigned to it.
    pub fn confident(label: Label, confidence: f64) -> Self {
        let probabilities = match label {
            Label::Legitimate => [confidence, 1.0 - confidence],
            Label::Phishing => [1.0 - confidence, confidence],
        };
        Self::new(label, probabilities)
    }

    /// Every call fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            outcome: Err(reason.into()),
            last_input: Arc::default(),
            calls: Arc::default(),
        }
    }

    /// Handle to the most recent input vector.
    pub fn last_input(&self) -> Arc<Mutex<Option<Vec<f64>>>> {
        Arc::clone(&self.last_input)
    }

    /// Number of inference calls answered so far.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    fn answer(&self, vector: &[f64]) -> Result<(Label, [f64; 2]), ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut slot) = self.last_input.lock() {
            *slot = Some(vector.to_vec());
        }
        self.outcome
            .clone()
            .map_err(ClassifierError::Inference)
    }
}

impl Classifier for FixedClassifier {
    fn name(&self) -> &str {
        "fixed"
    }

    fn predict(&self, vector: &[f64]) -> Result<Label, ClassifierError> {
        self.answer(vector).map(|(label, _)| label)
    }

    fn predict_probability(&self, vector: &[f64]) -> Result<[f64; 2], ClassifierError> {
        self.answer(vector).map(|(_, probabilities)| probabilities)
    }

    fn classify(&self, vector: &[f64]) -> Result<(Label, [f64; 2]), ClassifierError> {
        self.answer(vector)
    }
}
