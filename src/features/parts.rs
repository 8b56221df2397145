//! Raw URL decomposition.
//!
//! Splits the string as written, without the normalization a WHATWG parser
//! applies, so component lengths describe what the sender actually typed.
//! `scheme ":" ["//" authority] path ["?" query] ["#" fragment]`.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UrlParts<'a> {
    /// Scheme as written; empty when absent.
    pub scheme: &'a str,
    pub authority: &'a str,
    pub path: &'a str,
    pub query: &'a str,
    pub fragment: &'a str,
}

impl<'a> UrlParts<'a> {
    pub fn split(raw: &'a str) -> Self {
        let mut rest = raw.trim();
        let mut parts = Self::default();

        if let Some(colon) = rest.find(':')
            && is_scheme(&rest[..colon])
        {
            parts.scheme = &rest[..colon];
            rest = &rest[colon + 1..];
        }

        if let Some(after) = rest.strip_prefix("//") {
            let end = after.find(['/', '?', '#']).unwrap_or(after.len());
            parts.authority = &after[..end];
            rest = &after[end..];
        }

        if let Some((before, fragment)) = rest.split_once('#') {
            parts.fragment = fragment;
            rest = before;
        }
        if let Some((before, query)) = rest.split_once('?') {
            parts.query = query;
            rest = before;
        }
        parts.path = rest;
        parts
    }

    pub fn scheme_is(&self, scheme: &str) -> bool {
        self.scheme.eq_ignore_ascii_case(scheme)
    }

    /// Authority without userinfo or port, lowercased. Brackets around an
    /// IPv6 literal are removed. `None` when there is no authority.
    pub fn host(&self) -> Option<String> {
        if self.authority.is_empty() {
            return None;
        }
        let hostinfo = self
            .authority
            .rsplit_once('@')
            .map_or(self.authority, |(_, h)| h);

        let host = if let Some(bracketed) = hostinfo.strip_prefix('[') {
            bracketed.split_once(']').map_or(bracketed, |(inner, _)| inner)
        } else {
            hostinfo.split_once(':').map_or(hostinfo, |(h, _)| h)
        };

        let host = host.trim_end_matches('.');
        if host.is_empty() {
            None
        } else {
            Some(host.to_ascii_lowercase())
        }
    }
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
