use serde::{Deserialize, Serialize};
use strum::Display;

use crate::features::{Feature, FeatureSet};

/// URLs longer than this read as obfuscation.
pub const LONG_URL_THRESHOLD: f64 = 75.0;
/// More keyword hits than this trigger `suspicious_keywords`.
pub const KEYWORD_THRESHOLD: f64 = 2.0;
/// Registrations younger than this many days trigger `new_domain`.
pub const NEW_DOMAIN_DAYS: f64 = 30.0;
/// More `%`/`@`/`#` characters than this trigger `special_characters`.
pub const SPECIAL_CHARACTER_THRESHOLD: f64 = 3.0;

// PredicateId - stable identifier of one heuristic rule
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PredicateId {
    LongUrl,
    SuspiciousTld,
    IpHost,
    ShortenedUrl,
    SuspiciousKeywords,
    BrandInSubdomain,
    NoHttps,
    InvalidCertificate,
    NewDomain,
    SpecialCharacters,
    TyposquattingPattern,
}

/// One weighted rule over a feature set.
#[derive(Debug, Clone, Copy)]
pub struct Predicate {
    pub id: PredicateId,
    pub weight: f64,
    pub test: fn(&FeatureSet) -> bool,
}

impl Predicate {
    pub fn holds(&self, features: &FeatureSet) -> bool {
        (self.test)(features)
    }
}

/// Default rule table, in evaluation order.
pub const PREDICATES: [Predicate; 11] = [
    Predicate {
        id: PredicateId::LongUrl,
        weight: 0.10,
        test: long_url,
    },
    Predicate {
        id: PredicateId::SuspiciousTld,
        weight: 0.15,
        test: suspicious_tld,
    },
    Predicate {
        id: PredicateId::IpHost,
        weight: 0.20,
        test: ip_host,
    },
    Predicate {
        id: PredicateId::ShortenedUrl,
        weight: 0.10,
        test: shortened_url,
    },
    Predicate {
        id: PredicateId::SuspiciousKeywords,
        weight: 0.15,
        test: suspicious_keywords,
    },
    Predicate {
        id: PredicateId::BrandInSubdomain,
        weight: 0.15,
        test: brand_in_subdomain,
    },
    Predicate {
        id: PredicateId::NoHttps,
        weight: 0.10,
        test: no_https,
    },
    Predicate {
        id: PredicateId::InvalidCertificate,
        weight: 0.15,
        test: invalid_certificate,
    },
    Predicate {
        id: PredicateId::NewDomain,
        weight: 0.10,
        test: new_domain,
    },
    Predicate {
        id: PredicateId::SpecialCharacters,
        weight: 0.10,
        test: special_characters,
    },
    Predicate {
        id: PredicateId::TyposquattingPattern,
        weight: 0.10,
        test: typosquatting_pattern,
    },
];

fn long_url(f: &FeatureSet) -> bool {
    f.get(Feature::UrlLength) > LONG_URL_THRESHOLD
}

fn suspicious_tld(f: &FeatureSet) -> bool {
    f.flag(Feature::SuspiciousTld)
}

fn ip_host(f: &FeatureSet) -> bool {
    f.flag(Feature::HasIp)
}

fn shortened_url(f: &FeatureSet) -> bool {
    f.flag(Feature::IsShortened)
}

fn suspicious_keywords(f: &FeatureSet) -> bool {
    f.get(Feature::SuspiciousKeywords) > KEYWORD_THRESHOLD
}

fn brand_in_subdomain(f: &FeatureSet) -> bool {
    f.flag(Feature::DomainInSubdomain)
}

fn no_https(f: &FeatureSet) -> bool {
    !f.flag(Feature::HasHttps)
}

fn invalid_certificate(f: &FeatureSet) -> bool {
    f.flag(Feature::HasHttps) && !f.flag(Feature::HasValidSsl)
}

// Age 0 means unknown, not "registered today".
fn new_domain(f: &FeatureSet) -> bool {
    let age = f.get(Feature::DomainAge);
    age > 0.0 && age < NEW_DOMAIN_DAYS
}

pub(crate) fn special_character_count(f: &FeatureSet) -> f64 {
    f.get(Feature::NumPercent) + f.get(Feature::NumAtSymbols) + f.get(Feature::NumHashes)
}

fn special_characters(f: &FeatureSet) -> bool {
    special_character_count(f) > SPECIAL_CHARACTER_THRESHOLD
}

fn typosquatting_pattern(f: &FeatureSet) -> bool {
    f.flag(Feature::IsTyposquatting)
}
