//! String-only feature rules. Nothing here touches the network.

use std::collections::HashSet;

use url::Host;

use super::tables::FeatureTables;

/// Literal occurrences of `needle` in the raw URL.
pub fn count_char(raw: &str, needle: char) -> usize {
    raw.chars().filter(|&c| c == needle).count()
}

/// A brand name embedded in a host that is not the bare brand itself.
pub fn brand_in_host(host: &str, tables: &FeatureTables) -> bool {
    tables
        .brands()
        .iter()
        .any(|brand| host.contains(brand.as_str()) && host != brand)
}

/// IPv4 literal in any form the URL standard folds to an address
/// (`192.168.1.1`, `0x7f.1`, `3232235777`).
pub fn is_ipv4_host(host: &str) -> bool {
    matches!(Host::parse(host), Ok(Host::Ipv4(_)))
}

pub fn is_shortener(host: &str, tables: &FeatureTables) -> bool {
    tables.shortening_services().iter().any(|service| {
        host == service
            || host
                .strip_suffix(service.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

pub fn has_suspicious_tld(host: &str, tables: &FeatureTables) -> bool {
    tables
        .suspicious_tlds()
        .iter()
        .any(|tld| host.ends_with(tld.as_str()))
}

/// Number of table entries found in the lowercased URL.
pub fn keyword_hits(raw: &str, tables: &FeatureTables) -> usize {
    let lowered = raw.to_lowercase();
    tables
        .suspicious_keywords()
        .iter()
        .filter(|keyword| lowered.contains(keyword.as_str()))
        .count()
}

pub fn has_port(authority: &str) -> bool {
    authority.contains(':') && !authority.starts_with('[')
}

/// Distinct decoded keys that carry a non-empty value.
pub fn distinct_params(query: &str) -> usize {
    url::form_urlencoded::parse(query.as_bytes())
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, _)| key)
        .collect::<HashSet<_>>()
        .len()
}

pub fn has_redirect(query: &str) -> bool {
    let lowered = query.to_lowercase();
    lowered.contains("redirect") || lowered.contains("url=")
}

/// Long runs of one character or a digit-heavy host.
pub fn looks_typosquatted(host: &str) -> bool {
    longest_run(host) >= 4 || host.chars().filter(char::is_ascii_digit).count() > 3
}

fn longest_run(s: &str) -> usize {
    let mut best = 0;
    let mut run = 0;
    let mut prev = None;
    for c in s.chars() {
        if prev == Some(c) {
            run += 1;
        } else {
            run = 1;
            prev = Some(c);
        }
        best = best.max(run);
    }
    best
}
