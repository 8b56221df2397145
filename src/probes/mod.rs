//! Network signal probes.
//!
//! Each probe is a single bounded attempt. Whatever happens (success,
//! timeout, refusal, a malformed host) comes back as a [`ProbeOutcome`]; the
//! feature extractor decides what neutral value a non-answer maps to.

pub mod dns;
pub mod live;
pub mod tls;
pub mod whois;

pub use live::LiveProbes;

use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Boxed future returned by [`NetworkProbes`] methods.
pub type ProbeFuture<'a, T> = Pin<Box<dyn Future<Output = ProbeOutcome<T>> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome<T> {
    /// The probe answered.
    Resolved(T),
    /// No answer inside the time budget.
    TimedOut,
    /// The probe ran and errored.
    Failed(String),
    /// Not attempted: probing disabled, or the host does not apply.
    Skipped,
}

impl<T> ProbeOutcome<T> {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    pub fn resolved(self) -> Option<T> {
        match self {
            Self::Resolved(value) => Some(value),
            _ => None,
        }
    }

    pub fn unwrap_or(self, default: T) -> T {
        self.resolved().unwrap_or(default)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Resolved(_) => "resolved",
            Self::TimedOut => "timed_out",
            Self::Failed(_) => "failed",
            Self::Skipped => "skipped",
        }
    }
}

/// Run `fut` under `budget`, folding its result into a [`ProbeOutcome`].
pub async fn guarded<T, E, F>(budget: Duration, fut: F) -> ProbeOutcome<T>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    match tokio::time::timeout(budget, fut).await {
        Ok(Ok(value)) => ProbeOutcome::Resolved(value),
        Ok(Err(err)) => ProbeOutcome::Failed(err.to_string()),
        Err(_) => ProbeOutcome::TimedOut,
    }
}

/// The three lookups the extractor consults.
///
/// Implementations must bound every call themselves; callers await the
/// returned futures without an outer timeout.
pub trait NetworkProbes: Send + Sync {
    /// Human-readable backend name (e.g. "live", "static")
    fn name(&self) -> &str;

    /// Does `host` resolve to at least one address?
    fn resolve<'a>(&'a self, host: &'a str) -> ProbeFuture<'a, bool>;

    /// Does a verified TLS handshake with `host:443` complete?
    fn tls_handshake<'a>(&'a self, host: &'a str) -> ProbeFuture<'a, bool>;

    /// Days since the registrable domain of `host` was registered.
    /// May be negative when the registry reports a future date.
    fn registration_age<'a>(&'a self, host: &'a str) -> ProbeFuture<'a, i64>;
}

/// Fixed answers, for offline runs and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticProbes {
    pub dns: ProbeOutcome<bool>,
    pub tls: ProbeOutcome<bool>,
    pub registration_age: ProbeOutcome<i64>,
}

impl StaticProbes {
    /// Every probe reports [`ProbeOutcome::Skipped`].
    pub fn disabled() -> Self {
        Self {
            dns: ProbeOutcome::Skipped,
            tls: ProbeOutcome::Skipped,
            registration_age: ProbeOutcome::Skipped,
        }
    }

    /// A healthy, resolvable host with a valid certificate.
    pub fn healthy(age_days: i64) -> Self {
        Self {
            dns: ProbeOutcome::Resolved(true),
            tls: ProbeOutcome::Resolved(true),
            registration_age: ProbeOutcome::Resolved(age_days),
        }
    }
}

impl NetworkProbes for StaticProbes {
    fn name(&self) -> &str {
        "static"
    }

    fn resolve<'a>(&'a self, _host: &'a str) -> ProbeFuture<'a, bool> {
        let outcome = self.dns.clone();
        Box::pin(async move { outcome })
    }

    fn tls_handshake<'a>(&'a self, _host: &'a str) -> ProbeFuture<'a, bool> {
        let outcome = self.tls.clone();
        Box::pin(async move { outcome })
    }

    fn registration_age<'a>(&'a self, _host: &'a str) -> ProbeFuture<'a, i64> {
        let outcome = self.registration_age.clone();
        Box::pin(async move { outcome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn guarded_maps_success() {
        let outcome = guarded(Duration::from_secs(1), async { Ok::<_, String>(7) }).await;
        assert_eq!(outcome, ProbeOutcome::Resolved(7));
    }

    #[tokio::test]
    async fn guarded_maps_error() {
        let outcome: ProbeOutcome<u8> =
            guarded(Duration::from_secs(1), async { Err("refused") }).await;
        assert_eq!(outcome, ProbeOutcome::Failed("refused".into()));
        assert_eq!(outcome.kind(), "failed");
    }

    #[tokio::test]
    async fn guarded_times_out() {
        let outcome: ProbeOutcome<u8> = guarded(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, String>(1)
        })
        .await;
        assert_eq!(outcome, ProbeOutcome::TimedOut);
    }

    #[test]
    fn non_answers_fall_back() {
        assert!(!ProbeOutcome::<bool>::TimedOut.unwrap_or(false));
        assert_eq!(ProbeOutcome::Failed("x".into()).unwrap_or(0_i64), 0);
        assert_eq!(ProbeOutcome::Resolved(42_i64).unwrap_or(0), 42);
        assert!(!ProbeOutcome::<i64>::Skipped.is_resolved());
    }

    #[tokio::test]
    async fn static_probes_replay_outcomes() {
        let probes = StaticProbes {
            dns: ProbeOutcome::Resolved(true),
            tls: ProbeOutcome::TimedOut,
            registration_age: ProbeOutcome::Resolved(12),
        };
        assert_eq!(probes.resolve("a.com").await, ProbeOutcome::Resolved(true));
        assert_eq!(probes.tls_handshake("a.com").await, ProbeOutcome::TimedOut);
        assert_eq!(probes.registration_age("a.com").await, ProbeOutcome::Resolved(12));
    }
}
