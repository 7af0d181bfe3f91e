//! Metadata generation for pipeline initialization.

use super::error::InitError;
use super::error::InitResult;
use crate::config::load_onboarding;
use crate::validate::validate_onboarding;
use pipeline_protocol::config_models::DEFAULT_METADATA_DIR;
use pipeline_protocol::config_models::DEFAULT_ONBOARDING_FILE;
use pipeline_protocol::metadata_models::PipelineMetadata;
use pipeline_protocol::metadata_models::METADATA_FILE;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

/// Options for initializing pipeline metadata.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Project root; relative paths below are resolved against it.
    pub root: PathBuf,

    /// Onboarding document to initialize from.
    pub onboarding_file: PathBuf,

    /// Directory receiving `metadata.json`.
    pub metadata_dir: PathBuf,

    /// Overwrite existing metadata.
    pub force: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            onboarding_file: PathBuf::from(DEFAULT_ONBOARDING_FILE),
            metadata_dir: PathBuf::from(DEFAULT_METADATA_DIR),
            force: false,
        }
    }
}

/// Initialize pipeline metadata from the onboarding document.
///
/// This function:
/// 1. Loads the onboarding document
/// 2. Validates it, refusing to continue on any error
/// 3. Writes `metadata.json` into the metadata directory
///
/// # Returns
/// The written metadata, or an `InitError` if:
/// - The onboarding document is missing, unparsable or invalid
/// - Metadata already exists (without force flag)
/// - File system operations fail
pub async fn init_pipeline(options: InitOptions) -> InitResult<PipelineMetadata> {
    info!("Pipeline initialization start");

    let onboarding_path = options.root.join(&options.onboarding_file);
    let onboarding = load_onboarding(&onboarding_path)?;

    let report = validate_onboarding(&onboarding, &options.root);
    if !report.is_valid() {
        let errors = report
            .errors()
            .map(|issue| format!("  {issue}"))
            .collect::<Vec<_>>()
            .join("\n");
        return Err(InitError::InvalidOnboarding {
            path: onboarding_path,
            errors,
        });
    }

    let metadata_dir = options.root.join(&options.metadata_dir);
    let metadata_path = metadata_dir.join(METADATA_FILE);

    if metadata_path.exists() && !options.force {
        return Err(InitError::AlreadyInitialized(metadata_path));
    }

    fs::create_dir_all(&metadata_dir).map_err(|source| InitError::DirectoryCreate {
        path: metadata_dir.clone(),
        source,
    })?;

    let metadata = PipelineMetadata {
        id: Uuid::new_v4(),
        name: onboarding.name.clone(),
        environment: onboarding.environment.clone(),
        owner: onboarding.owner.clone(),
        onboarding_file: options.onboarding_file.clone(),
        created_at: chrono::Utc::now(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        steps: onboarding.steps.iter().map(|step| step.name.clone()).collect(),
        endpoints: onboarding
            .endpoints
            .iter()
            .map(|endpoint| endpoint.alias.clone())
            .collect(),
    };

    let json = serde_json::to_string_pretty(&metadata)?;
    fs::write(&metadata_path, json + "\n").map_err(|source| InitError::FileWrite {
        path: metadata_path.clone(),
        source,
    })?;

    info!(
        id = %metadata.id,
        path = %metadata_path.display(),
        "Pipeline initialization done"
    );

    Ok(metadata)
}

/// Read back metadata written by [`init_pipeline`].
pub fn load_metadata(metadata_dir: &Path) -> InitResult<PipelineMetadata> {
    let path = metadata_dir.join(METADATA_FILE);

    if !path.exists() {
        return Err(InitError::NotInitialized(path));
    }

    let content = fs::read_to_string(&path).map_err(|source| InitError::FileRead {
        path: path.clone(),
        source,
    })?;

    Ok(serde_json::from_str(&content)?)
}
