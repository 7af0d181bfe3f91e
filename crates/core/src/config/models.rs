//! Configuration models that aggregate all settings.

use pipeline_protocol::config_models::GlobalConfig;
use pipeline_protocol::onboarding_models::Onboarding;
use std::path::PathBuf;

/// Unified application configuration for one project directory.
///
/// Paths in `global` are relative to `root`; [`AppConfig::resolve`] turns
/// them into usable paths.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Project root every relative path is resolved against.
    pub root: PathBuf,

    /// Global settings from `pipeline.toml`.
    pub global: GlobalConfig,

    /// Resolved location of the onboarding document.
    pub onboarding_path: PathBuf,

    pub onboarding: Onboarding,
}

impl AppConfig {
    /// Resolve a path from configuration against the project root.
    ///
    /// Absolute paths are returned unchanged.
    pub fn resolve(&self, path: impl AsRef<std::path::Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Absolute-or-root-relative metadata directory.
    pub fn metadata_dir(&self) -> PathBuf {
        self.resolve(&self.global.metadata_dir)
    }
}
