//! Global configuration models for `pipeline.toml`.
//!
//! This module defines the structure of the optional project-wide settings
//! file. Every field has a default so a missing file or a partial file is
//! always usable.

use serde::Deserialize;
use serde::Serialize;
use std::path::PathBuf;

/// Name of the global settings file looked up in the project root.
pub const GLOBAL_CONFIG_FILE: &str = "pipeline.toml";

/// Default onboarding document name.
pub const DEFAULT_ONBOARDING_FILE: &str = "onboarding.yaml";

/// Default directory for pipeline metadata and fetched certificates.
pub const DEFAULT_METADATA_DIR: &str = ".pipeline";

/// Represents global settings from `pipeline.toml`.
///
/// # Example
///
/// ```toml
/// # pipeline.toml
/// onboarding-file = "deploy/onboarding.yaml"
/// metadata-dir = ".pipeline"
/// keytool = "/usr/lib/jvm/default/bin/keytool"
/// openssl = "openssl"
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default)]
pub struct GlobalConfig {
    /// Onboarding document, relative to the project root.
    pub onboarding_file: PathBuf,

    /// Directory that holds `metadata.json` and fetched certificates.
    pub metadata_dir: PathBuf,

    /// `keytool` executable used for truststore updates.
    pub keytool: String,

    /// `openssl` executable used for certificate fetching.
    pub openssl: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            onboarding_file: PathBuf::from(DEFAULT_ONBOARDING_FILE),
            metadata_dir: PathBuf::from(DEFAULT_METADATA_DIR),
            keytool: "keytool".to_string(),
            openssl: "openssl".to_string(),
        }
    }
}
