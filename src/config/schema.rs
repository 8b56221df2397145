use crate::error::ConfigError;
use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound for any single probe timeout.
pub const MAX_PROBE_TIMEOUT_SECS: u64 = 30;

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path the config was read from - computed, not serialized
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub tables: TablesConfig,
}

// ── Network probes ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Run DNS/TLS/WHOIS probes (default: true). When false every network
    /// feature takes its neutral value.
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_dns_timeout_secs")]
    pub dns_timeout_secs: u64,
    #[serde(default = "default_tls_timeout_secs")]
    pub tls_timeout_secs: u64,
    /// Budget for the whole WHOIS referral chain
    #[serde(default = "default_whois_timeout_secs")]
    pub whois_timeout_secs: u64,
    /// Bootstrap WHOIS server (default: whois.iana.org)
    #[serde(default = "default_whois_server")]
    pub whois_server: String,
}

fn default_true() -> bool {
    true
}

fn default_dns_timeout_secs() -> u64 {
    3
}

fn default_tls_timeout_secs() -> u64 {
    3
}

fn default_whois_timeout_secs() -> u64 {
    5
}

fn default_whois_server() -> String {
    "whois.iana.org".into()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dns_timeout_secs: default_dns_timeout_secs(),
            tls_timeout_secs: default_tls_timeout_secs(),
            whois_timeout_secs: default_whois_timeout_secs(),
            whois_server: default_whois_server(),
        }
    }
}

impl NetworkConfig {
    pub fn dns_timeout(&self) -> Duration {
        Duration::from_secs(self.dns_timeout_secs)
    }

    pub fn tls_timeout(&self) -> Duration {
        Duration::from_secs(self.tls_timeout_secs)
    }

    pub fn whois_timeout(&self) -> Duration {
        Duration::from_secs(self.whois_timeout_secs)
    }
}

// ── Classifier artifact ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Model artifact (`.json` forest or `.onnx`). `~` is expanded.
    /// Unset means heuristic-only scoring.
    #[serde(default = "default_model_path")]
    pub model_path: Option<String>,
}

fn default_model_path() -> Option<String> {
    Some("~/.phishsense/models/phishing_model.json".into())
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
        }
    }
}

impl ClassifierConfig {
    pub fn resolved_model_path(&self) -> Option<PathBuf> {
        let raw = self.model_path.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        Some(PathBuf::from(shellexpand::tilde(raw).into_owned()))
    }
}

// ── Feature tables ───────────────────────────────────────────────

/// Replacement lookup tables. Each `Some` replaces the built-in table
/// wholesale; `None` keeps the default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TablesConfig {
    #[serde(default)]
    pub suspicious_keywords: Option<Vec<String>>,
    #[serde(default)]
    pub suspicious_tlds: Option<Vec<String>>,
    #[serde(default)]
    pub shortening_services: Option<Vec<String>>,
    #[serde(default)]
    pub brands: Option<Vec<String>>,
}

impl Config {
    /// `~/.phishsense`
    pub fn default_dir() -> Result<PathBuf> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        Ok(home.join(".phishsense"))
    }

    /// Read `~/.phishsense/config.toml` when present, defaults otherwise.
    /// Environment overrides are applied in both cases.
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::default_dir()?.join("config.toml");
        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Read an explicit config file. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(ConfigError::Io)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::Load(e.to_string()))
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to config
    pub fn apply_env_overrides(&mut self) {
        // Model artifact: PHISHSENSE_MODEL
        if let Ok(model) = std::env::var("PHISHSENSE_MODEL")
            && !model.is_empty()
        {
            self.classifier.model_path = Some(model);
        }

        // Offline mode: PHISHSENSE_OFFLINE=1|true
        if let Ok(offline) = std::env::var("PHISHSENSE_OFFLINE")
            && matches!(offline.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
        {
            self.network.enabled = false;
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let timeouts = [
            ("network.dns_timeout_secs", self.network.dns_timeout_secs),
            ("network.tls_timeout_secs", self.network.tls_timeout_secs),
            ("network.whois_timeout_secs", self.network.whois_timeout_secs),
        ];
        for (key, secs) in timeouts {
            if secs == 0 || secs > MAX_PROBE_TIMEOUT_SECS {
                return Err(ConfigError::Validation(format!(
                    "{key} must be between 1 and {MAX_PROBE_TIMEOUT_SECS} seconds, got {secs}"
                )));
            }
        }
        let tables = [
            ("tables.suspicious_keywords", &self.tables.suspicious_keywords),
            ("tables.suspicious_tlds", &self.tables.suspicious_tlds),
            ("tables.shortening_services", &self.tables.shortening_services),
            ("tables.brands", &self.tables.brands),
        ];
        for (key, entries) in tables {
            if let Some(entries) = entries
                && entries.iter().any(|e| e.trim().trim_start_matches('.').is_empty())
            {
                return Err(ConfigError::Validation(format!(
                    "{key} must not contain blank entries"
                )));
            }
        }
        if self.network.whois_server.trim().is_empty() {
            return Err(ConfigError::Validation(
                "network.whois_server must not be empty".into(),
            ));
        }
        Ok(())
    }
}
