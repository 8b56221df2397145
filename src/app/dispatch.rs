use std::process::ExitCode;

use anyhow::{Context, Result};
use phishsense::{Config, DetectionResult, Detector};

use crate::cli::commands::Cli;

pub const EXIT_SAFE: u8 = 0;
pub const EXIT_PHISHING: u8 = 1;
pub const EXIT_ERROR: u8 = 2;

/// Config file (explicit or default), then environment, then flags.
pub fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = Config::load_from(path)?;
            config.apply_env_overrides();
            config
        }
        None => Config::load_or_default()?,
    };
    if let Some(model) = &cli.model {
        config.classifier.model_path = Some(model.to_string_lossy().into_owned());
    }
    if cli.offline {
        config.network.enabled = false;
    }
    Ok(config)
}

pub fn render(result: &DetectionResult, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(result)
    } else {
        serde_json::to_string_pretty(result)
    };
    json.context("Failed to serialize detection result")
}

pub fn exit_code(result: &DetectionResult) -> u8 {
    if result.is_phishing {
        EXIT_PHISHING
    } else {
        EXIT_SAFE
    }
}

pub async fn dispatch(cli: Cli) -> Result<ExitCode> {
    let config = resolve_config(&cli)?;
    let detector = Detector::from_config(&config)?;
    let result = detector.detect(&cli.url).await;
    println!("{}", render(&result, cli.compact)?);
    Ok(ExitCode::from(exit_code(&result)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["phishsense"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[classifier]\nmodel_path = \"/nope.json\"\n").unwrap();
        let path_arg = path.to_string_lossy().into_owned();

        let config = resolve_config(&cli(&[
            "http://a.com",
            "--config",
            &path_arg,
            "--model",
            "/override.json",
            "--offline",
        ]))
        .unwrap();
        assert_eq!(config.classifier.model_path.as_deref(), Some("/override.json"));
        assert!(!config.network.enabled);
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml").to_string_lossy().into_owned();
        assert!(resolve_config(&cli(&["http://a.com", "--config", &missing])).is_err());
    }

    #[tokio::test]
    async fn renders_json_and_exit_code() {
        let result = Detector::offline().detect("http://192.168.1.1/login?verify=1").await;
        let pretty = render(&result, false).unwrap();
        assert!(pretty.contains("\n  \"url\""));
        let compact = render(&result, true).unwrap();
        assert!(!compact.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&compact).unwrap();
        assert_eq!(value["threat_level"], "MEDIUM");
        assert!(value["ml_score"].is_null());
        assert_eq!(exit_code(&result), EXIT_SAFE);
    }
}
