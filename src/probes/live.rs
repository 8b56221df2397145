use std::sync::Arc;
use std::time::Duration;

use rustls::ClientConfig;

use super::{NetworkProbes, ProbeFuture, ProbeOutcome, dns, guarded, tls, whois};
use crate::config::NetworkConfig;
use crate::features::lexical::is_ipv4_host;

const HTTPS_PORT: u16 = 443;

/// Probes against the real network, each under its own timeout.
pub struct LiveProbes {
    dns_timeout: Duration,
    tls_timeout: Duration,
    whois_timeout: Duration,
    whois_server: String,
    tls_config: Option<Arc<ClientConfig>>,
}

impl LiveProbes {
    pub fn new(config: &NetworkConfig) -> Self {
        let tls_config = match tls::client_config() {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                tracing::warn!("TLS probe unavailable: {e}");
                None
            }
        };
        Self {
            dns_timeout: config.dns_timeout(),
            tls_timeout: config.tls_timeout(),
            whois_timeout: config.whois_timeout(),
            whois_server: config.whois_server.clone(),
            tls_config,
        }
    }
}

impl NetworkProbes for LiveProbes {
    fn name(&self) -> &str {
        "live"
    }

    fn resolve<'a>(&'a self, host: &'a str) -> ProbeFuture<'a, bool> {
        Box::pin(guarded(self.dns_timeout, dns::resolves(host)))
    }

    fn tls_handshake<'a>(&'a self, host: &'a str) -> ProbeFuture<'a, bool> {
        Box::pin(async move {
            let Some(config) = self.tls_config.clone() else {
                return ProbeOutcome::Failed("tls client unavailable".into());
            };
            guarded(self.tls_timeout, tls::handshake(config, host, HTTPS_PORT)).await
        })
    }

    fn registration_age<'a>(&'a self, host: &'a str) -> ProbeFuture<'a, i64> {
        Box::pin(async move {
            if is_ipv4_host(host) || host.contains(':') {
                return ProbeOutcome::Skipped;
            }
            let now = chrono::Utc::now();
            guarded(
                self.whois_timeout,
                whois::registration_age(&self.whois_server, host, now),
            )
            .await
        })
    }
}

impl std::fmt::Debug for LiveProbes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveProbes")
            .field("dns_timeout", &self.dns_timeout)
            .field("tls_timeout", &self.tls_timeout)
            .field("whois_timeout", &self.whois_timeout)
            .field("whois_server", &self.whois_server)
            .field("tls_ready", &self.tls_config.is_some())
            .finish()
    }
}
