//! Error types for initialization operations.

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for initialization operations.
pub type InitResult<T> = Result<T, InitError>;

/// Errors that can occur during initialization.
#[derive(Debug, Error)]
pub enum InitError {
    /// Metadata already exists and force flag was not set.
    #[error("Pipeline metadata already exists at {0:?}. Use --force to overwrite.")]
    AlreadyInitialized(PathBuf),

    /// The onboarding document could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The onboarding document has validation errors.
    #[error("Onboarding file {path:?} is invalid:\n{errors}")]
    InvalidOnboarding { path: PathBuf, errors: String },

    /// Metadata was never written for this project.
    #[error("No pipeline metadata at {0:?}. Run `pipeline --init` first.")]
    NotInitialized(PathBuf),

    /// Failed to create a directory.
    #[error("Failed to create directory {path:?}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write a file.
    #[error("Failed to write file {path:?}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read a file.
    #[error("Failed to read file {path:?}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Metadata could not be encoded or decoded.
    #[error("Malformed metadata: {0}")]
    Json(#[from] serde_json::Error),
}
