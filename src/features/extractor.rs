use std::sync::Arc;

use super::lexical;
use super::parts::UrlParts;
use super::tables::FeatureTables;
use super::{Feature, FeatureSet};
use crate::probes::{NetworkProbes, ProbeOutcome, StaticProbes};

/// Raw probe outcomes behind the network features of one extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSignals {
    pub dns: ProbeOutcome<bool>,
    pub tls: ProbeOutcome<bool>,
    pub registration_age: ProbeOutcome<i64>,
}

impl NetworkSignals {
    fn skipped() -> Self {
        Self {
            dns: ProbeOutcome::Skipped,
            tls: ProbeOutcome::Skipped,
            registration_age: ProbeOutcome::Skipped,
        }
    }

    /// Neutral defaults: anything but a definite answer reads as 0.
    #[allow(clippy::cast_precision_loss)]
    fn features(&self) -> [(Feature, f64); 3] {
        let resolves = self.dns.clone().unwrap_or(false);
        let valid_tls = self.tls.clone().unwrap_or(false);
        let age = self.registration_age.clone().unwrap_or(0).max(0);
        [
            (Feature::DnsRecordCount, flag(resolves)),
            (Feature::HasValidSsl, flag(valid_tls)),
            (Feature::DomainAge, age as f64),
        ]
    }
}

/// Turns a URL string into a [`FeatureSet`].
///
/// Extraction never fails. Unparseable components contribute zeros and
/// probe trouble contributes neutral values.
pub struct FeatureExtractor {
    tables: FeatureTables,
    probes: Arc<dyn NetworkProbes>,
}

impl FeatureExtractor {
    pub fn new(tables: FeatureTables, probes: Arc<dyn NetworkProbes>) -> Self {
        Self { tables, probes }
    }

    /// Default tables, no network access.
    pub fn offline() -> Self {
        Self::new(FeatureTables::default(), Arc::new(StaticProbes::disabled()))
    }

    pub fn tables(&self) -> &FeatureTables {
        &self.tables
    }

    pub fn probes_name(&self) -> &str {
        self.probes.name()
    }

    pub async fn extract(&self, url: &str) -> FeatureSet {
        self.extract_with_signals(url).await.0
    }

    /// Like [`extract`](Self::extract), also returning how each probe ended.
    pub async fn extract_with_signals(&self, url: &str) -> (FeatureSet, NetworkSignals) {
        let parts = UrlParts::split(url);
        let host = parts.host();
        let mut pairs = self.lexical_pairs(url, &parts, host.as_deref());

        let signals = match host.as_deref() {
            Some(host) => self.probe(host, parts.scheme_is("https")).await,
            None => NetworkSignals::skipped(),
        };
        tracing::debug!(
            url,
            probes = self.probes.name(),
            dns = signals.dns.kind(),
            tls = signals.tls.kind(),
            whois = signals.registration_age.kind(),
            "network signals collected"
        );
        pairs.extend(signals.features());

        (FeatureSet::from_pairs(pairs), signals)
    }

    /// The three probes are independent and run concurrently. TLS is only
    /// attempted for `https` URLs; anything else has no valid certificate
    /// by definition.
    async fn probe(&self, host: &str, https: bool) -> NetworkSignals {
        let tls = async {
            if https {
                self.probes.tls_handshake(host).await
            } else {
                ProbeOutcome::Skipped
            }
        };
        let (dns, tls, registration_age) = tokio::join!(
            self.probes.resolve(host),
            tls,
            self.probes.registration_age(host),
        );
        NetworkSignals {
            dns,
            tls,
            registration_age,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn lexical_pairs(&self, url: &str, parts: &UrlParts<'_>, host: Option<&str>) -> Vec<(Feature, f64)> {
        let count = |c: char| lexical::count_char(url, c) as f64;
        let url_length = url.chars().count() as f64;
        let num_dots = count('.');
        let num_hyphens = count('-');

        let mut pairs = vec![
            (Feature::UrlLength, url_length),
            (Feature::HostnameLength, parts.authority.chars().count() as f64),
            (Feature::PathLength, parts.path.chars().count() as f64),
            (Feature::QueryLength, parts.query.chars().count() as f64),
            (Feature::NumDots, num_dots),
            (Feature::NumHyphens, num_hyphens),
            (Feature::NumUnderscores, count('_')),
            (Feature::NumSlashes, count('/')),
            (Feature::NumQuestionMarks, count('?')),
            (Feature::NumEquals, count('=')),
            (Feature::NumAmpersands, count('&')),
            (Feature::NumPercent, count('%')),
            (Feature::NumAtSymbols, count('@')),
            (Feature::NumExclamation, count('!')),
            (Feature::NumSpaces, count(' ')),
            (Feature::NumTildes, count('~')),
            (Feature::NumCommas, count(',')),
            (Feature::NumPlus, count('+')),
            (Feature::NumAsterisks, count('*')),
            (Feature::NumHashes, count('#')),
            (Feature::NumDollar, count('$')),
            (Feature::NumColons, count(':')),
            (Feature::HasHttps, flag(parts.scheme_is("https"))),
            (Feature::HasHttp, flag(parts.scheme_is("http"))),
            (Feature::HasFtp, flag(parts.scheme_is("ftp"))),
            (
                Feature::SuspiciousKeywords,
                lexical::keyword_hits(url, &self.tables) as f64,
            ),
            (Feature::HasPort, flag(lexical::has_port(parts.authority))),
            (Feature::NumParams, lexical::distinct_params(parts.query) as f64),
            (Feature::HasRedirect, flag(lexical::has_redirect(parts.query))),
        ];

        if url_length > 0.0 {
            pairs.push((Feature::DotsToLength, num_dots / url_length));
            pairs.push((Feature::HyphensToLength, num_hyphens / url_length));
        }

        if let Some(host) = host {
            pairs.extend([
                (
                    Feature::DomainInSubdomain,
                    flag(lexical::brand_in_host(host, &self.tables)),
                ),
                (Feature::HasIp, flag(lexical::is_ipv4_host(host))),
                (
                    Feature::IsShortened,
                    flag(lexical::is_shortener(host, &self.tables)),
                ),
                (
                    Feature::SuspiciousTld,
                    flag(lexical::has_suspicious_tld(host, &self.tables)),
                ),
                (
                    Feature::IsTyposquatting,
                    flag(lexical::looks_typosquatted(host)),
                ),
            ]);
        }
        pairs
    }
}

fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}
