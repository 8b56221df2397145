#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unnecessary_literal_bound,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod classifier;
pub mod config;
pub mod detector;
pub mod error;
pub mod features;
pub mod fusion;
pub mod probes;
pub mod reasons;
pub mod scoring;
pub mod threat;

pub use classifier::{Classifier, ClassifierAdapter, ClassifierVerdict, Label};
pub use config::Config;
pub use detector::{DetectionResult, Detector};
pub use error::{PhishSenseError, Result};
pub use features::{Feature, FeatureExtractor, FeatureSet, FeatureTables};
pub use scoring::{HeuristicScorer, HeuristicVerdict, PredicateId};
pub use threat::ThreatLevel;
