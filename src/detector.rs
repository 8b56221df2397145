use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::classifier::{ClassifierAdapter, ClassifierVerdict, Label};
use crate::config::Config;
use crate::error::PhishSenseError;
use crate::features::{FeatureExtractor, FeatureSet, FeatureTables};
use crate::fusion::fuse;
use crate::probes::{LiveProbes, NetworkProbes, StaticProbes};
use crate::reasons::explain;
use crate::scoring::HeuristicScorer;
use crate::threat::{ThreatLevel, is_phishing};

/// Everything known about one URL after detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub url: String,
    pub is_phishing: bool,
    pub final_score: f64,
    pub threat_level: ThreatLevel,
    pub heuristic_score: f64,
    /// Classifier label (0 legitimate, 1 phishing); null when absent.
    pub ml_score: Option<u8>,
    pub ml_confidence: Option<f64>,
    pub reasons: Vec<String>,
    pub features: FeatureSet,
}

impl DetectionResult {
    pub fn classifier_verdict(&self) -> Option<ClassifierVerdict> {
        let label = match self.ml_score? {
            0 => Label::Legitimate,
            _ => Label::Phishing,
        };
        Some(ClassifierVerdict {
            label,
            confidence: self.ml_confidence.unwrap_or(0.0),
        })
    }
}

/// The full pipeline: extract, score, classify, fuse, explain.
///
/// Cheap to share; one instance serves any number of concurrent calls.
pub struct Detector {
    extractor: FeatureExtractor,
    scorer: HeuristicScorer,
    classifier: ClassifierAdapter,
}

impl Detector {
    pub fn new(
        extractor: FeatureExtractor,
        scorer: HeuristicScorer,
        classifier: ClassifierAdapter,
    ) -> Self {
        Self {
            extractor,
            scorer,
            classifier,
        }
    }

    /// Offline, heuristic-only detector with default tables.
    pub fn offline() -> Self {
        Self::new(
            FeatureExtractor::offline(),
            HeuristicScorer::default(),
            ClassifierAdapter::absent(),
        )
    }

    /// Wire live (or disabled) probes, configured tables and the configured
    /// classifier artifact.
    pub fn from_config(config: &Config) -> Result<Self, PhishSenseError> {
        let probes: Arc<dyn NetworkProbes> = if config.network.enabled {
            Arc::new(LiveProbes::new(&config.network))
        } else {
            Arc::new(StaticProbes::disabled())
        };
        let extractor = FeatureExtractor::new(FeatureTables::from_config(&config.tables), probes);
        let model_path = config.classifier.resolved_model_path();
        let classifier = ClassifierAdapter::load(model_path.as_deref())?;

        tracing::debug!(
            probes = extractor.probes_name(),
            classifier = classifier.name().unwrap_or("none"),
            "detector ready"
        );
        Ok(Self::new(extractor, HeuristicScorer::default(), classifier))
    }

    pub fn classifier(&self) -> &ClassifierAdapter {
        &self.classifier
    }

    pub async fn detect(&self, url: &str) -> DetectionResult {
        self.run(url)
            .instrument(tracing::debug_span!("detect", url))
            .await
    }

    async fn run(&self, url: &str) -> DetectionResult {
        let features = self.extractor.extract(url).await;
        let heuristic = self.scorer.score(&features);
        let verdict = self.classifier.predict(&features);

        let final_score = fuse(heuristic.score, verdict.as_ref());
        let threat_level = ThreatLevel::from_score(final_score);
        let reasons = explain(&heuristic, &features);

        let result = DetectionResult {
            url: url.to_string(),
            is_phishing: is_phishing(final_score),
            final_score,
            threat_level,
            heuristic_score: heuristic.score,
            ml_score: verdict.map(|v| v.label.as_u8()),
            ml_confidence: verdict.map(|v| v.confidence),
            reasons,
            features,
        };
        tracing::info!(
            url,
            score = result.final_score,
            level = %result.threat_level,
            phishing = result.is_phishing,
            "detection complete"
        );
        result
    }
}

impl std::fmt::Debug for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detector")
            .field("probes", &self.extractor.probes_name())
            .field("predicates", &self.scorer.predicates().len())
            .field("classifier", &self.classifier)
            .finish()
    }
}
