use std::path::PathBuf;

use clap::Parser;

/// `PhishSense` - phishing risk scoring for a single URL.
#[derive(Parser, Debug)]
#[command(name = "phishsense")]
#[command(version = "0.1.0")]
#[command(about = "Score a URL for phishing risk.", long_about = None)]
pub struct Cli {
    /// URL to analyze
    pub url: String,

    /// Classifier artifact (.json forest or .onnx); overrides config
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Config file (default: ~/.phishsense/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Skip DNS, TLS and WHOIS probes
    #[arg(long)]
    pub offline: bool,

    /// Single-line JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_url_and_flags() {
        let cli = Cli::try_parse_from([
            "phishsense",
            "http://192.168.1.1/login",
            "--model",
            "/tmp/m.json",
            "--offline",
            "--compact",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.url, "http://192.168.1.1/login");
        assert_eq!(cli.model, Some(PathBuf::from("/tmp/m.json")));
        assert!(cli.offline && cli.compact && cli.verbose);
        assert!(cli.config.is_none());
    }

    #[test]
    fn url_is_required() {
        assert!(Cli::try_parse_from(["phishsense"]).is_err());
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
