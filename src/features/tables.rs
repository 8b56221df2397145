//! Lookup tables consulted by the extractor.
//!
//! Defaults are static; a [`FeatureTables`] owns its own copy so tests and
//! configuration can swap any table without touching global state.

use crate::config::TablesConfig;

/// Credential/urgency vocabulary. Repeated entries are intentional: each
/// entry that matches counts once, so a repeated word counts twice.
pub const SUSPICIOUS_KEYWORDS: &[&str] = &[
    "secure", "verify", "account", "update", "confirm", "login", "signin", "banking", "ebayisapi",
    "paypal", "webscr", "secure", "account", "update", "confirm", "suspend", "restrict", "limited",
    "unusual", "activity", "verify", "validate", "urgent", "immediate",
];

pub const SUSPICIOUS_TLDS: &[&str] = &[".tk", ".ml", ".ga", ".cf", ".gq", ".xyz", ".top"];

pub const SHORTENING_SERVICES: &[&str] = &[
    "bit.ly",
    "tinyurl.com",
    "goo.gl",
    "ow.ly",
    "t.co",
    "is.gd",
    "buff.ly",
    "adf.ly",
    "shorte.st",
    "bc.vc",
    "v.gd",
    "vzturl.com",
];

pub const BRANDS: &[&str] = &[
    "google",
    "microsoft",
    "apple",
    "amazon",
    "facebook",
    "paypal",
    "ebay",
    "bank",
    "wellsfargo",
    "chase",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureTables {
    suspicious_keywords: Vec<String>,
    suspicious_tlds: Vec<String>,
    shortening_services: Vec<String>,
    brands: Vec<String>,
}

impl Default for FeatureTables {
    fn default() -> Self {
        Self {
            suspicious_keywords: lowered(SUSPICIOUS_KEYWORDS),
            suspicious_tlds: lowered(SUSPICIOUS_TLDS),
            shortening_services: lowered(SHORTENING_SERVICES),
            brands: lowered(BRANDS),
        }
    }
}

impl FeatureTables {
    /// Defaults with any configured table replaced wholesale.
    pub fn from_config(config: &TablesConfig) -> Self {
        let mut tables = Self::default();
        if let Some(keywords) = &config.suspicious_keywords {
            tables = tables.with_suspicious_keywords(keywords);
        }
        if let Some(tlds) = &config.suspicious_tlds {
            tables = tables.with_suspicious_tlds(tlds);
        }
        if let Some(services) = &config.shortening_services {
            tables = tables.with_shortening_services(services);
        }
        if let Some(brands) = &config.brands {
            tables = tables.with_brands(brands);
        }
        tables
    }

    pub fn with_suspicious_keywords<S: AsRef<str>>(mut self, keywords: &[S]) -> Self {
        self.suspicious_keywords = lowered(keywords);
        self
    }

    /// Entries without a leading dot get one, so `tk` and `.tk` are equivalent.
    pub fn with_suspicious_tlds<S: AsRef<str>>(mut self, tlds: &[S]) -> Self {
        self.suspicious_tlds = lowered(tlds)
            .iter()
            .map(|tld| tld.trim_start_matches('.'))
            .filter(|tld| !tld.is_empty())
            .map(|tld| format!(".{tld}"))
            .collect();
        self
    }

    pub fn with_shortening_services<S: AsRef<str>>(mut self, services: &[S]) -> Self {
        self.shortening_services = lowered(services);
        self
    }

    pub fn with_brands<S: AsRef<str>>(mut self, brands: &[S]) -> Self {
        self.brands = lowered(brands);
        self
    }

    pub fn suspicious_keywords(&self) -> &[String] {
        &self.suspicious_keywords
    }

    pub fn suspicious_tlds(&self) -> &[String] {
        &self.suspicious_tlds
    }

    pub fn shortening_services(&self) -> &[String] {
        &self.shortening_services
    }

    pub fn brands(&self) -> &[String] {
        &self.brands
    }
}

fn lowered<S: AsRef<str>>(entries: &[S]) -> Vec<String> {
    entries
        .iter()
        .map(|e| e.as_ref().trim().to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}
