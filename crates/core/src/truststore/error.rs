//! Error types for truststore operations.

use crate::executor::ExecutorError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for truststore operations.
pub type TruststoreResult<T> = Result<T, TruststoreError>;

#[derive(Debug, Error)]
pub enum TruststoreError {
    /// An endpoint target given on the command line could not be parsed.
    #[error("Invalid endpoint target {target:?}: {reason}")]
    InvalidTarget { target: String, reason: String },

    /// Neither the onboarding document nor the command line names a truststore.
    #[error("No truststore configured; add a `truststore` section or pass --truststore")]
    MissingConfig,

    /// An external tool is not installed.
    #[error("Required tool '{0}' was not found in PATH")]
    MissingTool(String),

    /// The password environment variable is unset.
    #[error("Truststore password variable {0} is not set")]
    MissingPassword(String),

    #[error("Truststore not found at {0:?}")]
    NotFound(PathBuf),

    /// A server response or PEM file contained no certificates.
    #[error("No certificates found for {target}: {detail}")]
    NoCertificates { target: String, detail: String },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Executor(#[from] ExecutorError),
}
