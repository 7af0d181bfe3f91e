//! Configuration file loader.
//!
//! This module reads:
//! - `pipeline.toml`: optional global settings in the project root
//! - the onboarding document (`onboarding.yaml` unless configured otherwise)

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::AppConfig;
use pipeline_protocol::config_models::GlobalConfig;
use pipeline_protocol::config_models::GLOBAL_CONFIG_FILE;
use pipeline_protocol::onboarding_models::Onboarding;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;

/// Loads the full configuration for the project at `root`.
///
/// # Arguments
///
/// * `root` - Project root containing `pipeline.toml` and the onboarding file
/// * `onboarding_override` - Onboarding path that takes precedence over the
///   `onboarding-file` setting; relative paths are resolved against `root`
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - The onboarding document does not exist
/// - A file exists but cannot be read
/// - A file has invalid TOML or YAML syntax
///
/// # Example
///
/// ```rust,no_run
/// use pipeline_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("."), None).await?;
/// println!("Loaded onboarding for {}", config.onboarding.name);
/// # Ok(())
/// # }
/// ```
pub async fn load_config(root: &Path, onboarding_override: Option<&Path>) -> ConfigResult<AppConfig> {
    let global = load_global_config(root)?;

    let onboarding_path = root.join(onboarding_override.unwrap_or(global.onboarding_file.as_path()));
    let onboarding = load_onboarding(&onboarding_path)?;

    Ok(AppConfig {
        root: root.to_path_buf(),
        global,
        onboarding_path,
        onboarding,
    })
}

/// Loads global configuration from `pipeline.toml`.
///
/// A missing file yields the defaults.
pub fn load_global_config(root: &Path) -> ConfigResult<GlobalConfig> {
    let config_path = root.join(GLOBAL_CONFIG_FILE);

    if !config_path.exists() {
        debug!("No {GLOBAL_CONFIG_FILE} in {}, using defaults", root.display());
        return Ok(GlobalConfig::default());
    }

    let content =
        std::fs::read_to_string(&config_path).map_err(|source| ConfigError::FileRead {
            path: config_path.clone(),
            source,
        })?;

    let config: GlobalConfig =
        toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: config_path,
            source,
        })?;

    Ok(config)
}

/// Loads and parses an onboarding document.
pub fn load_onboarding(path: &Path) -> ConfigResult<Onboarding> {
    if !path.exists() {
        return Err(ConfigError::MissingOnboarding(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let onboarding: Onboarding =
        serde_yaml::from_str(&content).map_err(|source| ConfigError::YamlParse {
            path: PathBuf::from(path),
            source,
        })?;

    debug!(
        name = %onboarding.name,
        endpoints = onboarding.endpoints.len(),
        steps = onboarding.steps.len(),
        "Loaded onboarding from {}",
        path.display()
    );

    Ok(onboarding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const ONBOARDING: &str = r#"name: payments-service
owner: team-payments
truststore:
  path: certs/truststore.jks
endpoints:
  - alias: payments-api
    host: api.example.com
steps:
  - name: hello
    command: "echo hello"
"#;

    #[tokio::test]
    async fn test_load_config_acceptance() {
        let dir = tempdir().expect("Failed to create temp dir");
        let root = dir.path();

        fs::write(root.join("onboarding.yaml"), ONBOARDING).expect("Failed to write onboarding");

        let config = load_config(root, None).await.expect("Failed to load config");

        assert_eq!(config.global, GlobalConfig::default());
        assert_eq!(config.onboarding_path, root.join("onboarding.yaml"));
        assert_eq!(config.onboarding.name, "payments-service");
        assert_eq!(config.onboarding.endpoints.len(), 1);
        assert_eq!(config.onboarding.steps.len(), 1);
        assert_eq!(config.metadata_dir(), root.join(".pipeline"));
    }

    #[tokio::test]
    async fn test_load_config_uses_global_onboarding_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let root = dir.path();

        fs::create_dir_all(root.join("deploy")).expect("Failed to create deploy dir");
        fs::write(root.join("deploy/service.yaml"), ONBOARDING)
            .expect("Failed to write onboarding");
        fs::write(
            root.join("pipeline.toml"),
            "onboarding-file = \"deploy/service.yaml\"\nmetadata-dir = \"meta\"\n",
        )
        .expect("Failed to write pipeline.toml");

        let config = load_config(root, None).await.expect("Failed to load config");

        assert_eq!(config.onboarding_path, root.join("deploy/service.yaml"));
        assert_eq!(config.metadata_dir(), root.join("meta"));
    }

    #[tokio::test]
    async fn test_load_config_override_wins() {
        let dir = tempdir().expect("Failed to create temp dir");
        let root = dir.path();

        fs::write(root.join("other.yaml"), "name: other\n").expect("Failed to write onboarding");
        fs::write(root.join("onboarding.yaml"), ONBOARDING).expect("Failed to write onboarding");

        let config = load_config(root, Some(Path::new("other.yaml")))
            .await
            .expect("Failed to load config");

        assert_eq!(config.onboarding.name, "other");
    }

    #[tokio::test]
    async fn test_load_config_missing_onboarding() {
        let dir = tempdir().expect("Failed to create temp dir");

        let result = load_config(dir.path(), None).await;

        match result {
            Err(ConfigError::MissingOnboarding(path)) => {
                assert!(path.ends_with("onboarding.yaml"))
            }
            other => panic!("Expected MissingOnboarding error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_global_config_invalid_toml() {
        let dir = tempdir().expect("Failed to create temp dir");
        fs::write(dir.path().join("pipeline.toml"), "metadata-dir = [invalid toml")
            .expect("Failed to write pipeline.toml");

        let result = load_global_config(dir.path());

        if let Err(ConfigError::TomlParse { path, .. }) = result {
            assert!(path.ends_with("pipeline.toml"));
        } else {
            panic!("Expected TomlParse error");
        }
    }

    #[test]
    fn test_load_onboarding_invalid_yaml() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("onboarding.yaml");
        fs::write(&path, "name: test\n  invalid: [yaml").expect("Failed to write onboarding");

        let result = load_onboarding(&path);

        if let Err(ConfigError::YamlParse { path, .. }) = result {
            assert!(path.ends_with("onboarding.yaml"));
        } else {
            panic!("Expected YamlParse error");
        }
    }

    #[test]
    fn test_load_onboarding_missing_name() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("onboarding.yaml");
        fs::write(&path, "owner: nobody\n").expect("Failed to write onboarding");

        assert!(matches!(
            load_onboarding(&path),
            Err(ConfigError::YamlParse { .. })
        ));
    }
}
