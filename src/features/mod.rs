//! URL feature model and extraction.
//!
//! A [`FeatureSet`] is the fixed-schema numeric encoding of one URL. The
//! first [`CANONICAL_FEATURE_COUNT`] features, in declaration order, are the
//! classifier input vector; the rest are descriptive extras kept in the
//! output record.

pub mod extractor;
pub mod lexical;
pub mod parts;
pub mod tables;

pub use extractor::{FeatureExtractor, NetworkSignals};
pub use tables::FeatureTables;

use std::collections::HashMap;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use strum::{EnumCount, IntoEnumIterator};

/// Bumped whenever the canonical list changes order or membership.
pub const FEATURE_SCHEMA_VERSION: u32 = 1;

/// Number of features fed to a classifier, in declaration order.
pub const CANONICAL_FEATURE_COUNT: usize = 29;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::EnumCount,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Feature {
    // ── Canonical (classifier input) ────────────────────────────
    UrlLength,
    HostnameLength,
    PathLength,
    QueryLength,
    NumDots,
    NumHyphens,
    NumUnderscores,
    NumSlashes,
    NumQuestionMarks,
    NumEquals,
    NumAmpersands,
    NumPercent,
    NumAtSymbols,
    HasHttps,
    HasHttp,
    DomainInSubdomain,
    HasIp,
    IsShortened,
    SuspiciousTld,
    SuspiciousKeywords,
    HasPort,
    NumParams,
    HasRedirect,
    DomainAge,
    HasValidSsl,
    DnsRecordCount,
    IsTyposquatting,
    DotsToLength,
    HyphensToLength,
    // ── Descriptive extras ──────────────────────────────────────
    NumExclamation,
    NumSpaces,
    NumTildes,
    NumCommas,
    NumPlus,
    NumAsterisks,
    NumHashes,
    NumDollar,
    NumColons,
    HasFtp,
}

impl Feature {
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_canonical(self) -> bool {
        self.index() < CANONICAL_FEATURE_COUNT
    }

    /// Ratio features are the only non-integral values in a set.
    pub fn is_ratio(self) -> bool {
        matches!(self, Self::DotsToLength | Self::HyphensToLength)
    }

    /// Canonical features in classifier input order.
    pub fn canonical() -> impl Iterator<Item = Feature> {
        Self::iter().take(CANONICAL_FEATURE_COUNT)
    }
}

/// Immutable, fully-populated feature map.
///
/// Every feature is present; anything never set reads as 0. Negative and
/// non-finite inputs are stored as 0.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    values: [f64; Feature::COUNT],
}

impl FeatureSet {
    pub fn zeroed() -> Self {
        Self {
            values: [0.0; Feature::COUNT],
        }
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Feature, f64)>,
    {
        let mut set = Self::zeroed();
        for (feature, value) in pairs {
            set.values[feature.index()] = sanitize(value);
        }
        set
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    pub fn flag(&self, feature: Feature) -> bool {
        self.get(feature) > 0.0
    }

    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        Feature::from_str(name).ok().map(|f| self.get(f))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::iter().map(|f| (f, self.get(f)))
    }

    /// Canonical-order input vector for a classifier.
    pub fn to_vector(&self) -> Vec<f64> {
        Feature::canonical().map(|f| self.get(f)).collect()
    }
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self::zeroed()
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

// Serialized as an ordered object; counts as integers, ratios as floats.
impl Serialize for FeatureSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Feature::COUNT))?;
        for (feature, value) in self.iter() {
            if feature.is_ratio() {
                map.serialize_entry(feature.name(), &value)?;
            } else {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                map.serialize_entry(feature.name(), &(value.round() as u64))?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FeatureSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = HashMap::<String, f64>::deserialize(deserializer)?;
        let mut pairs = Vec::with_capacity(raw.len());
        for (name, value) in raw {
            let feature = Feature::from_str(&name)
                .map_err(|_| de::Error::custom(format!("unknown feature `{name}`")))?;
            pairs.push((feature, value));
        }
        Ok(FeatureSet::from_pairs(pairs))
    }
}
