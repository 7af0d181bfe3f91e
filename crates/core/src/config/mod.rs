//! Configuration loading and management.
//!
//! This module loads the optional `pipeline.toml` global settings and the
//! onboarding document they point at.

pub mod error;
pub mod loader;
pub mod models;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, load_global_config, load_onboarding};
pub use models::AppConfig;
