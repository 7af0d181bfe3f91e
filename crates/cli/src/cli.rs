//! Command-line definition and tracing setup.

use clap::Parser;
use std::path::PathBuf;

/// Onboarding pipeline: validate the onboarding document, manage the
/// truststore and run the pipeline steps.
///
/// Several actions may be given at once; they always run in the order
/// validate, init, backup, fetch, update, run.
#[derive(Parser, Debug)]
#[command(name = "pipeline", version, long_about = None)]
pub(crate) struct Cli {
    /// Validate the onboarding document.
    #[arg(long)]
    pub validate: bool,

    /// Initialize pipeline metadata from the onboarding document.
    #[arg(long)]
    pub init: bool,

    /// Fetch the certificate chain of every endpoint.
    #[arg(long = "fetch_certificates")]
    pub fetch_certificates: bool,

    /// Copy the truststore into its backup directory.
    #[arg(long = "backup_truststore")]
    pub backup_truststore: bool,

    /// Import certificates into the truststore.
    #[arg(long = "update_truststore")]
    pub update_truststore: bool,

    /// Execute the onboarding steps.
    #[arg(long)]
    pub run: bool,

    /// Single endpoint target (host[:port] or URL) replacing the
    /// onboarding endpoints.
    #[arg(short, long, value_name = "URL")]
    pub url: Option<String>,

    /// Truststore path, overriding the onboarding document.
    #[arg(short, long, value_name = "PATH")]
    pub truststore: Option<PathBuf>,

    /// PEM file to import; the file stem becomes the alias.
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Output file for a single-endpoint fetch or a backup.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Project root.
    #[arg(short = 'C', long, value_name = "DIR", default_value = ".")]
    pub project_dir: PathBuf,

    /// Onboarding document, relative to the project root.
    #[arg(short = 'f', long, value_name = "FILE")]
    pub onboarding: Option<PathBuf>,

    /// Overwrite existing metadata on --init.
    #[arg(long)]
    pub force: bool,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,
}

impl Cli {
    /// True when at least one action flag is set.
    pub fn has_action(&self) -> bool {
        self.validate
            || self.init
            || self.fetch_certificates
            || self.backup_truststore
            || self.update_truststore
            || self.run
    }
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Initialize tracing based on CLI flags. `RUST_LOG` wins over `-v`.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match cli.verbose {
        0 => "pipeline=info",
        1 => "pipeline=debug",
        _ => "pipeline=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_underscore_flags() {
        let cli = Cli::parse_from([
            "pipeline",
            "--fetch_certificates",
            "--update_truststore",
            "-u",
            "api.example.com:8443",
            "-vv",
        ]);

        assert!(cli.fetch_certificates);
        assert!(cli.update_truststore);
        assert!(!cli.backup_truststore);
        assert_eq!(cli.url.as_deref(), Some("api.example.com:8443"));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.project_dir, PathBuf::from("."));
        assert!(cli.has_action());
    }

    #[test]
    fn test_no_action() {
        let cli = Cli::parse_from(["pipeline", "-C", "/tmp", "--force"]);
        assert!(!cli.has_action());
    }

    #[test]
    fn test_missing_value_is_usage_error() {
        let err = Cli::try_parse_from(["pipeline", "--url"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
