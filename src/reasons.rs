//! Human-readable rationale for a heuristic verdict.

use crate::features::{Feature, FeatureSet};
use crate::scoring::predicates::special_character_count;
use crate::scoring::{HeuristicVerdict, PredicateId};

pub const NO_INDICATORS: &str = "No obvious phishing indicators detected";

/// Presentation order. Independent of the order rules are evaluated in.
const REASON_ORDER: [PredicateId; 11] = [
    PredicateId::SuspiciousTld,
    PredicateId::IpHost,
    PredicateId::ShortenedUrl,
    PredicateId::BrandInSubdomain,
    PredicateId::SuspiciousKeywords,
    PredicateId::NoHttps,
    PredicateId::InvalidCertificate,
    PredicateId::NewDomain,
    PredicateId::LongUrl,
    PredicateId::SpecialCharacters,
    PredicateId::TyposquattingPattern,
];

/// One sentence per fired rule, or [`NO_INDICATORS`] when none fired.
pub fn explain(verdict: &HeuristicVerdict, features: &FeatureSet) -> Vec<String> {
    let reasons: Vec<String> = REASON_ORDER
        .iter()
        .filter(|id| verdict.fired(**id))
        .map(|id| describe(*id, features))
        .collect();
    if reasons.is_empty() {
        vec![NO_INDICATORS.to_string()]
    } else {
        reasons
    }
}

fn describe(id: PredicateId, features: &FeatureSet) -> String {
    match id {
        PredicateId::SuspiciousTld => "Uses suspicious top-level domain".into(),
        PredicateId::IpHost => "Domain is an IP address".into(),
        PredicateId::ShortenedUrl => "Uses URL shortening service".into(),
        PredicateId::BrandInSubdomain => {
            "Legitimate domain appears in subdomain (possible typosquatting)".into()
        }
        PredicateId::SuspiciousKeywords => format!(
            "Contains {} suspicious keywords",
            whole(features.get(Feature::SuspiciousKeywords))
        ),
        PredicateId::NoHttps => "Does not use HTTPS".into(),
        PredicateId::InvalidCertificate => "HTTPS certificate is invalid".into(),
        PredicateId::NewDomain => format!(
            "Domain is very new ({} days old)",
            whole(features.get(Feature::DomainAge))
        ),
        PredicateId::LongUrl => "URL is unusually long".into(),
        PredicateId::SpecialCharacters => format!(
            "Contains {} encoded or special characters",
            whole(special_character_count(features))
        ),
        PredicateId::TyposquattingPattern => "Shows typosquatting patterns".into(),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole(value: f64) -> u64 {
    value.max(0.0).round() as u64
}
