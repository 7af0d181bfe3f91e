//! Certificate fetching, truststore backup and truststore update.

use super::error::TruststoreError;
use super::error::TruststoreResult;
use super::pem::extract_pem_certificates;
use crate::executor::Command;
use crate::executor::CommandRunner;
use crate::executor::RunOptions;
use chrono::DateTime;
use chrono::Utc;
use pipeline_protocol::onboarding_models::Endpoint;
use pipeline_protocol::onboarding_models::TruststoreConfig;
use pipeline_protocol::onboarding_models::DEFAULT_PASSWORD_ENV;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;
use tracing::info;

/// Truststore location with every path resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruststoreSettings {
    pub path: PathBuf,
    pub password_env: String,
    pub store_type: String,
    pub backup_dir: PathBuf,
}

impl TruststoreSettings {
    /// Settings for a truststore given only by path, using the same defaults
    /// as the onboarding document.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let backup_dir = path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join("backups");
        Self {
            path,
            password_env: DEFAULT_PASSWORD_ENV.to_string(),
            store_type: "jks".to_string(),
            backup_dir,
        }
    }

    /// Resolve an onboarding `truststore` section against the project root.
    pub fn from_config(config: &TruststoreConfig, root: &Path) -> Self {
        Self {
            path: root.join(&config.path),
            password_env: config.password_env.clone(),
            store_type: config.store_type.clone(),
            backup_dir: root.join(config.resolved_backup_dir()),
        }
    }

    /// Replace the truststore path, keeping credentials and store type.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }
}

/// Certificates written by [`fetch_certificates`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedCertificates {
    pub alias: String,
    pub path: PathBuf,
    pub count: usize,
}

/// Locate an external tool in `PATH`.
pub fn require_tool(name: &str) -> TruststoreResult<PathBuf> {
    which::which(name).map_err(|_| TruststoreError::MissingTool(name.to_string()))
}

/// Fetch the certificate chain presented by `endpoint` and write it as PEM.
///
/// Runs `openssl s_client -showcerts` with an empty stdin so the TLS session
/// closes right after the handshake.
pub async fn fetch_certificates(
    runner: &dyn CommandRunner,
    openssl: &str,
    endpoint: &Endpoint,
    output: &Path,
) -> TruststoreResult<FetchedCertificates> {
    let connect = format!("{}:{}", endpoint.host, endpoint.port);
    info!(alias = %endpoint.alias, "Fetching certificates from {connect}");

    let command = Command::from_args([
        openssl,
        "s_client",
        "-showcerts",
        "-servername",
        endpoint.host.as_str(),
        "-connect",
        connect.as_str(),
    ])?;
    let answer = runner.run(command, RunOptions::new().with_stdin("")).await?;

    let certificates = extract_pem_certificates(&answer.stdout);
    if certificates.is_empty() {
        return Err(TruststoreError::NoCertificates {
            target: connect,
            detail: format!("exit code {}: {}", answer.exit_code, answer.stderr.trim()),
        });
    }

    write_file(output, certificates.concat().as_bytes()).await?;

    info!(
        alias = %endpoint.alias,
        count = certificates.len(),
        "Saved certificate chain to {}",
        output.display()
    );

    Ok(FetchedCertificates {
        alias: endpoint.alias.clone(),
        path: output.to_path_buf(),
        count: certificates.len(),
    })
}

/// Copy the truststore to `output`, or to a timestamped file in the backup
/// directory.
pub async fn backup_truststore(
    settings: &TruststoreSettings,
    output: Option<&Path>,
) -> TruststoreResult<PathBuf> {
    if !settings.path.exists() {
        return Err(TruststoreError::NotFound(settings.path.clone()));
    }

    let target = match output {
        Some(path) => path.to_path_buf(),
        None => settings
            .backup_dir
            .join(backup_file_name(&settings.path, Utc::now())),
    };

    create_parent(&target).await?;
    tokio::fs::copy(&settings.path, &target)
        .await
        .map_err(|source| TruststoreError::Io {
            path: target.clone(),
            source,
        })?;

    info!(
        "Truststore {} backed up to {}",
        settings.path.display(),
        target.display()
    );

    Ok(target)
}

/// Import every certificate of a PEM file into the truststore.
///
/// The first certificate is stored under `alias`, the following ones under
/// `alias-1`, `alias-2`, ... Existing entries with those aliases are
/// replaced. Returns the number of imported certificates.
pub async fn update_truststore(
    runner: &dyn CommandRunner,
    keytool: &str,
    settings: &TruststoreSettings,
    cert_file: &Path,
    alias: &str,
) -> TruststoreResult<usize> {
    let password = std::env::var(&settings.password_env)
        .map_err(|_| TruststoreError::MissingPassword(settings.password_env.clone()))?;

    let pem = tokio::fs::read_to_string(cert_file)
        .await
        .map_err(|source| TruststoreError::Io {
            path: cert_file.to_path_buf(),
            source,
        })?;

    let certificates = extract_pem_certificates(&pem);
    if certificates.is_empty() {
        return Err(TruststoreError::NoCertificates {
            target: cert_file.display().to_string(),
            detail: "no PEM certificate blocks".to_string(),
        });
    }

    create_parent(&settings.path).await?;
    let store = settings.path.to_string_lossy();

    for (i, certificate) in certificates.iter().enumerate() {
        let entry_alias = if i == 0 {
            alias.to_string()
        } else {
            format!("{alias}-{i}")
        };

        // keytool only imports the first certificate of a file.
        let cert_path = tempfile::Builder::new()
            .prefix("pipeline-cert-")
            .suffix(".pem")
            .tempfile()
            .map_err(|source| TruststoreError::Io {
                path: std::env::temp_dir(),
                source,
            })?
            .into_temp_path();
        write_file(&cert_path, certificate.as_bytes()).await?;
        let cert_arg = cert_path.to_string_lossy();

        let delete = Command::from_args([
            keytool,
            "-delete",
            "-alias",
            entry_alias.as_str(),
            "-keystore",
            &*store,
            "-storetype",
            settings.store_type.as_str(),
            "-storepass",
            password.as_str(),
        ])?;
        let removed = runner.run(delete, RunOptions::new().hidden(true)).await?;
        debug!(
            alias = %entry_alias,
            existed = removed.success(),
            "Removed previous truststore entry"
        );

        let import = Command::from_args([
            keytool,
            "-importcert",
            "-noprompt",
            "-trustcacerts",
            "-alias",
            entry_alias.as_str(),
            "-file",
            &*cert_arg,
            "-keystore",
            &*store,
            "-storetype",
            settings.store_type.as_str(),
            "-storepass",
            password.as_str(),
        ])?;
        runner
            .run(import, RunOptions::new().hidden(true).checked(true))
            .await?;

        info!("Imported certificate {entry_alias} into {store}");
    }

    Ok(certificates.len())
}

/// `<stem>-<UTC timestamp>[.<ext>]` for a truststore path.
pub(crate) fn backup_file_name(path: &Path, now: DateTime<Utc>) -> String {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "truststore".to_string());
    let stamp = now.format("%Y%m%dT%H%M%SZ");

    match path.extension() {
        Some(ext) => format!("{stem}-{stamp}.{}", ext.to_string_lossy()),
        None => format!("{stem}-{stamp}"),
    }
}

async fn create_parent(path: &Path) -> TruststoreResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| TruststoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    Ok(())
}

async fn write_file(path: &Path, contents: &[u8]) -> TruststoreResult<()> {
    create_parent(path).await?;
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| TruststoreError::Io {
            path: path.to_path_buf(),
            source,
        })
}
