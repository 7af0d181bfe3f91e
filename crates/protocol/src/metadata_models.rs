//! Pipeline metadata written by `pipeline --init`.

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

/// File name of the metadata document inside the metadata directory.
pub const METADATA_FILE: &str = "metadata.json";

/// Snapshot of an initialized pipeline.
///
/// Each `--init` produces a fresh `id`, so two initializations of the same
/// onboarding document are distinguishable.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct PipelineMetadata {
    pub id: Uuid,

    /// Onboarding `name`.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Onboarding document the metadata was generated from.
    pub onboarding_file: PathBuf,

    pub created_at: DateTime<Utc>,

    /// Version of the tool that wrote the metadata.
    pub tool_version: String,

    /// Step names in execution order.
    #[serde(default)]
    pub steps: Vec<String>,

    /// Endpoint aliases.
    #[serde(default)]
    pub endpoints: Vec<String>,
}
