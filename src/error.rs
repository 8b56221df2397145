use std::path::PathBuf;

use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Errors that may cross the crate boundary.
///
/// Detection itself never fails: probe and classifier problems are absorbed
/// into neutral defaults. What remains is configuration trouble and the one
/// classifier failure that cannot be told apart from a broken setup: a model
/// path whose existence cannot even be checked.
#[derive(Debug, Error)]
pub enum PhishSenseError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Classifier path ─────────────────────────────────────────────────
    #[error("classifier path {} cannot be inspected: {source}", path.display())]
    ClassifierPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Classifier errors ──────────────────────────────────────────────────────

/// Failures inside the classifier adapter. These are logged and collapsed to
/// "classifier absent"; they never reach a detection caller.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("artifact io: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact format: {0}")]
    Format(String),

    #[error("input shape: expected {expected} features, got {actual}")]
    Shape { expected: usize, actual: usize },

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("{0} support not compiled in")]
    Unsupported(&'static str),
}

impl From<serde_json::Error> for ClassifierError {
    fn from(err: serde_json::Error) -> Self {
        Self::Format(err.to_string())
    }
}

// ─── Probe errors ───────────────────────────────────────────────────────────

/// Failures of a single network probe before it is collapsed to a
/// `ProbeOutcome`.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("tls: {0}")]
    Tls(String),

    #[error("invalid host: {0}")]
    InvalidHost(String),

    #[error("whois: {0}")]
    Whois(String),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, PhishSenseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_displays_correctly() {
        let err = PhishSenseError::Config(ConfigError::Validation("bad timeout".into()));
        assert!(err.to_string().contains("validation failed"));
    }

    #[test]
    fn classifier_path_error_names_path() {
        let err = PhishSenseError::ClassifierPath {
            path: PathBuf::from("/locked/model.json"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().contains("/locked/model.json"));
    }

    #[test]
    fn shape_error_reports_counts() {
        let err = ClassifierError::Shape {
            expected: 29,
            actual: 3,
        };
        assert!(err.to_string().contains("29"));
        assert!(err.to_string().contains('3'));
    }

    #[test]
    fn serde_errors_become_format_errors() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ClassifierError = parse_err.into();
        assert!(matches!(err, ClassifierError::Format(_)));
    }
}
