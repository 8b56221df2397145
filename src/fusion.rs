//! Blend of heuristic score and classifier verdict.

use crate::classifier::ClassifierVerdict;

/// Above this the classifier dominates.
pub const HIGH_CONFIDENCE: f64 = 0.7;
/// Above this (up to [`HIGH_CONFIDENCE`]) both sides weigh equally.
pub const MEDIUM_CONFIDENCE: f64 = 0.5;

/// Final score in `[0, 1]`.
///
/// Without a verdict the heuristic passes through unchanged. Otherwise the
/// classifier's weight grows with its confidence: 0.3, 0.5 or 0.7.
pub fn fuse(heuristic: f64, verdict: Option<&ClassifierVerdict>) -> f64 {
    let Some(verdict) = verdict else {
        return heuristic.clamp(0.0, 1.0);
    };
    let classifier_weight = if verdict.confidence > HIGH_CONFIDENCE {
        0.7
    } else if verdict.confidence > MEDIUM_CONFIDENCE {
        0.5
    } else {
        0.3
    };
    let fused = (1.0 - classifier_weight) * heuristic + classifier_weight * verdict.label.as_f64();
    fused.clamp(0.0, 1.0)
}
