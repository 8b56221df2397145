use serde::{Deserialize, Serialize};

pub const CRITICAL_THRESHOLD: f64 = 0.70;
pub const HIGH_THRESHOLD: f64 = 0.50;
pub const MEDIUM_THRESHOLD: f64 = 0.30;
pub const LOW_THRESHOLD: f64 = 0.15;

/// Scores strictly above this are reported as phishing. A score of exactly
/// 0.5 is HIGH but not phishing.
pub const PHISHING_THRESHOLD: f64 = 0.5;

// ThreatLevel - ordinal bucket of a final score
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ThreatLevel {
    Safe,
    Low,
    Medium,
    High,
    Critical,
}

impl ThreatLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= CRITICAL_THRESHOLD {
            Self::Critical
        } else if score >= HIGH_THRESHOLD {
            Self::High
        } else if score >= MEDIUM_THRESHOLD {
            Self::Medium
        } else if score >= LOW_THRESHOLD {
            Self::Low
        } else {
            Self::Safe
        }
    }
}

pub fn is_phishing(score: f64) -> bool {
    score > PHISHING_THRESHOLD
}
