//! ONNX Runtime backend for classifiers exported with a label output and a
//! `[1, 2]` probability output.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ndarray::Array2;
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Value;

use super::{Classifier, Label};
use crate::error::ClassifierError;
use crate::features::CANONICAL_FEATURE_COUNT;

pub struct OnnxClassifier {
    path: PathBuf,
    // `Session::run` needs `&mut`; concurrent detections take turns.
    session: Mutex<Session>,
}

impl OnnxClassifier {
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        let session = Session::builder()
            .map_err(|e| ClassifierError::Inference(format!("session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ClassifierError::Inference(format!("optimization level: {e}")))?
            .commit_from_file(path)
            .map_err(|e| ClassifierError::Format(format!("load {}: {e}", path.display())))?;

        if session.outputs.len() < 2 {
            return Err(ClassifierError::Format(format!(
                "expected label and probability outputs, model has {}",
                session.outputs.len()
            )));
        }
        Ok(Self {
            path: path.to_path_buf(),
            session: Mutex::new(session),
        })
    }

    fn run(&self, vector: &[f64]) -> Result<(Label, [f64; 2]), ClassifierError> {
        if vector.len() != CANONICAL_FEATURE_COUNT {
            return Err(ClassifierError::Shape {
                expected: CANONICAL_FEATURE_COUNT,
                actual: vector.len(),
            });
        }
        #[allow(clippy::cast_possible_truncation)]
        let input: Vec<f32> = vector.iter().map(|&v| v as f32).collect();
        let array = Array2::<f32>::from_shape_vec((1, CANONICAL_FEATURE_COUNT), input)
            .map_err(|e| ClassifierError::Inference(format!("input array: {e}")))?;
        let tensor = Value::from_array(array)
            .map_err(|e| ClassifierError::Inference(format!("input tensor: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ClassifierError::Inference("session lock poisoned".into()))?;
        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| ClassifierError::Inference(format!("run: {e}")))?;

        let (_, labels) = outputs[0]
            .try_extract_tensor::<i64>()
            .map_err(|e| ClassifierError::Format(format!("label output: {e}")))?;
        let label = labels
            .first()
            .copied()
            .ok_or_else(|| ClassifierError::Format("empty label output".into()))
            .and_then(Label::try_from)?;

        let (_, probabilities) = outputs[1]
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Format(format!("probability output: {e}")))?;
        let [p0, p1] = probabilities else {
            return Err(ClassifierError::Format(format!(
                "expected 2 probabilities, got {}",
                probabilities.len()
            )));
        };
        Ok((label, [f64::from(*p0), f64::from(*p1)]))
    }
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &str {
        "onnx"
    }

    fn predict(&self, vector: &[f64]) -> Result<Label, ClassifierError> {
        self.run(vector).map(|(label, _)| label)
    }

    fn predict_probability(&self, vector: &[f64]) -> Result<[f64; 2], ClassifierError> {
        self.run(vector).map(|(_, probabilities)| probabilities)
    }

    fn classify(&self, vector: &[f64]) -> Result<(Label, [f64; 2]), ClassifierError> {
        self.run(vector)
    }
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
