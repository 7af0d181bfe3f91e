//! Onboarding document models for `onboarding.yaml`.
//!
//! The onboarding document describes a service joining the pipeline: who
//! owns it, which TLS endpoints it talks to, the truststore those endpoints'
//! certificates go into, and the shell steps run by `pipeline --run`.

use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

/// Environment variable read for the truststore password when the document
/// does not name one.
pub const DEFAULT_PASSWORD_ENV: &str = "TRUSTSTORE_PASSWORD";

/// Default TLS port for endpoints.
pub const DEFAULT_TLS_PORT: u16 = 443;

/// Truststore formats understood by `keytool`.
pub const SUPPORTED_STORE_TYPES: [&str; 2] = ["jks", "pkcs12"];

/// How a command is executed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExecMode {
    /// Spawn the program directly and capture stdout/stderr separately.
    #[default]
    Normal,

    /// Run through the shell, streaming merged output line by line.
    Call,
}

/// Full onboarding document.
///
/// # Example
///
/// ```yaml
/// name: payments-service
/// owner: team-payments
/// environment: staging
/// truststore:
///   path: certs/truststore.jks
///   password-env: TRUSTSTORE_PASSWORD
/// endpoints:
///   - alias: payments-api
///     host: api.example.com
/// steps:
///   - name: lint
///     command: "cargo fmt --check"
///     mode: call
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Onboarding {
    /// Service name. Also used as the metadata name.
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub owner: Option<String>,

    #[serde(default)]
    pub environment: Option<String>,

    /// Truststore receiving endpoint certificates.
    ///
    /// Required as soon as `endpoints` is non-empty.
    #[serde(default)]
    pub truststore: Option<TruststoreConfig>,

    #[serde(default)]
    pub endpoints: Vec<Endpoint>,

    /// Steps executed in order by `pipeline --run`.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Truststore location and credentials.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct TruststoreConfig {
    pub path: PathBuf,

    /// Name of the environment variable holding the store password.
    #[serde(default = "default_password_env")]
    pub password_env: String,

    /// `jks` or `pkcs12`.
    #[serde(default = "default_store_type")]
    pub store_type: String,

    #[serde(default)]
    pub backup_dir: Option<PathBuf>,
}

impl TruststoreConfig {
    /// Backup directory, falling back to `backups/` next to the truststore.
    pub fn resolved_backup_dir(&self) -> PathBuf {
        match &self.backup_dir {
            Some(dir) => dir.clone(),
            None => self
                .path
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join("backups"),
        }
    }
}

fn default_password_env() -> String {
    DEFAULT_PASSWORD_ENV.to_string()
}

fn default_store_type() -> String {
    "jks".to_string()
}

/// A TLS endpoint whose certificate chain should be trusted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Endpoint {
    /// Truststore alias for the endpoint's certificates.
    pub alias: String,

    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_TLS_PORT
}

/// A single `--run` step.
///
/// Exactly one of `command` and `parallel` must be set; the validator
/// enforces this rather than the parser so both mistakes get reported.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Step {
    pub name: String,

    #[serde(default)]
    pub command: Option<String>,

    /// Commands spawned concurrently.
    #[serde(default)]
    pub parallel: Vec<String>,

    #[serde(default)]
    pub mode: ExecMode,

    /// Treat a non-zero exit as a failure that stops the run.
    #[serde(default = "default_check")]
    pub check: bool,

    /// Keep the command line out of logs and answers.
    #[serde(default)]
    pub hidden: bool,

    #[serde(default)]
    pub stdin: Option<String>,
}

fn default_check() -> bool {
    true
}

impl Step {
    /// Whether this step runs a parallel group.
    pub fn is_parallel(&self) -> bool {
        !self.parallel.is_empty()
    }
}
