//! Action dispatch.

use crate::cli::Cli;
use clap::CommandFactory;
use color_eyre::eyre::{bail, eyre, Result, WrapErr};
use colored::Colorize;
use pipeline_core::config::{load_config, load_global_config, load_onboarding, AppConfig};
use pipeline_core::engine::{PipelineEngine, RunSummary, StepStatus};
use pipeline_core::executor::CmdExecutor;
use pipeline_core::init::{init_pipeline, InitOptions};
use pipeline_core::truststore::{
    backup_truststore, fetch_certificates, parse_target, require_tool, update_truststore,
    FetchedCertificates, TruststoreError, TruststoreSettings,
};
use pipeline_core::validate::{validate_onboarding, Severity, ValidationReport};
use pipeline_protocol::config_models::GlobalConfig;
use pipeline_protocol::onboarding_models::{Endpoint, Onboarding};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Resolved locations shared by every action of one invocation.
struct Context {
    cli: Cli,
    root: PathBuf,
    global: GlobalConfig,
    onboarding_path: PathBuf,
    executor: CmdExecutor,
}

impl Context {
    fn new(mut cli: Cli) -> Result<Self> {
        let root = cli
            .project_dir
            .canonicalize()
            .wrap_err_with(|| format!("Project directory {} not found", cli.project_dir.display()))?;

        // Commands run inside the project root, so paths given relative
        // to the caller's directory are made absolute first.
        let cwd = std::env::current_dir()?;
        for path in [&mut cli.truststore, &mut cli.input, &mut cli.output]
            .into_iter()
            .flatten()
        {
            *path = cwd.join(&*path);
        }

        let global = load_global_config(&root)?;
        let onboarding_file = cli
            .onboarding
            .clone()
            .unwrap_or_else(|| global.onboarding_file.clone());
        let onboarding_path = root.join(onboarding_file);
        let executor = CmdExecutor::new().with_working_dir(&root);

        Ok(Self {
            cli,
            root,
            global,
            onboarding_path,
            executor,
        })
    }

    async fn app_config(&self) -> Result<AppConfig> {
        Ok(load_config(&self.root, self.cli.onboarding.as_deref()).await?)
    }

    fn onboarding(&self) -> Result<Onboarding> {
        Ok(load_onboarding(&self.onboarding_path)?)
    }

    fn metadata_dir(&self) -> PathBuf {
        self.root.join(&self.global.metadata_dir)
    }

    /// `--url` replaces the onboarding endpoints.
    fn endpoints(&self) -> Result<Vec<Endpoint>> {
        match &self.cli.url {
            Some(url) => Ok(vec![parse_target(url)?]),
            None => Ok(self.onboarding()?.endpoints),
        }
    }

    /// `--truststore` replaces the configured path; without it the
    /// onboarding document must have a `truststore` section.
    fn truststore(&self) -> Result<TruststoreSettings> {
        let configured = if self.onboarding_path.exists() {
            self.onboarding()?.truststore
        } else {
            None
        };

        match (configured, &self.cli.truststore) {
            (Some(config), Some(path)) => {
                Ok(TruststoreSettings::from_config(&config, &self.root).with_path(path))
            }
            (Some(config), None) => Ok(TruststoreSettings::from_config(&config, &self.root)),
            (None, Some(path)) => Ok(TruststoreSettings::new(path)),
            (None, None) => Err(TruststoreError::MissingConfig.into()),
        }
    }

    fn cert_path(&self, alias: &str) -> PathBuf {
        self.metadata_dir().join("certs").join(format!("{alias}.pem"))
    }
}

/// Run every requested action in order, stopping at the first failure.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    if !cli.has_action() {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    }

    if cli.output.is_some() && cli.backup_truststore && cli.fetch_certificates {
        bail!("--output is ambiguous when combining --backup_truststore and --fetch_certificates");
    }

    let ctx = Context::new(cli)?;

    if ctx.cli.validate {
        validate(&ctx).await?;
    }
    if ctx.cli.init {
        init(&ctx).await?;
    }
    if ctx.cli.backup_truststore {
        backup(&ctx).await?;
    }
    let fetched = if ctx.cli.fetch_certificates {
        fetch(&ctx).await?
    } else {
        Vec::new()
    };
    if ctx.cli.update_truststore {
        update(&ctx, &fetched).await?;
    }
    if ctx.cli.run {
        run_steps(&ctx).await?;
    }

    Ok(())
}

async fn validate(ctx: &Context) -> Result<()> {
    let config = ctx.app_config().await?;
    let report = validate_onboarding(&config.onboarding, &config.root);

    print_report(&config.onboarding_path, &report);

    if !report.is_valid() {
        bail!(
            "{} is invalid ({} errors)",
            config.onboarding_path.display(),
            report.errors().count()
        );
    }
    Ok(())
}

fn print_report(path: &Path, report: &ValidationReport) {
    for issue in &report.issues {
        let label = match issue.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };
        println!("{label}: {}: {}", issue.field.bold(), issue.message);
    }

    if report.is_valid() {
        println!("{} {} is valid", "✓".green(), path.display());
    } else {
        println!("{} {} is invalid", "✗".red(), path.display());
    }
}

async fn init(ctx: &Context) -> Result<()> {
    let options = InitOptions {
        root: ctx.root.clone(),
        onboarding_file: ctx
            .cli
            .onboarding
            .clone()
            .unwrap_or_else(|| ctx.global.onboarding_file.clone()),
        metadata_dir: ctx.global.metadata_dir.clone(),
        force: ctx.cli.force,
    };

    let metadata = init_pipeline(options).await?;

    println!(
        "{} Initialized pipeline {} ({})",
        "✓".green(),
        metadata.name.bold(),
        metadata.id
    );
    Ok(())
}

async fn backup(ctx: &Context) -> Result<()> {
    let settings = ctx.truststore()?;
    let target = backup_truststore(&settings, ctx.cli.output.as_deref()).await?;

    println!("{} Backed up truststore to {}", "✓".green(), target.display());
    Ok(())
}

async fn fetch(ctx: &Context) -> Result<Vec<FetchedCertificates>> {
    let endpoints = ctx.endpoints()?;
    if endpoints.is_empty() {
        bail!("No endpoints to fetch; add `endpoints` to the onboarding document or pass --url");
    }
    if ctx.cli.output.is_some() && endpoints.len() > 1 {
        bail!("--output needs a single endpoint, got {}", endpoints.len());
    }

    let openssl = require_tool(&ctx.global.openssl)?;
    let openssl = openssl.to_string_lossy();

    let mut fetched = Vec::with_capacity(endpoints.len());
    for endpoint in &endpoints {
        let output = ctx
            .cli
            .output
            .clone()
            .unwrap_or_else(|| ctx.cert_path(&endpoint.alias));

        let certificates = fetch_certificates(&ctx.executor, &openssl, endpoint, &output)
            .await
            .wrap_err_with(|| format!("Fetching certificates for '{}' failed", endpoint.alias))?;

        println!(
            "{} {}: {} certificates saved to {}",
            "✓".green(),
            certificates.alias.bold(),
            certificates.count,
            certificates.path.display()
        );
        fetched.push(certificates);
    }

    Ok(fetched)
}

/// Import `--input`, the certificates fetched in this invocation, or the
/// previously fetched file of every endpoint.
async fn update(ctx: &Context, fetched: &[FetchedCertificates]) -> Result<()> {
    let imports: Vec<(String, PathBuf)> = if let Some(input) = &ctx.cli.input {
        let alias = input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .ok_or_else(|| eyre!("Cannot derive an alias from {}", input.display()))?;
        vec![(alias, input.clone())]
    } else if !fetched.is_empty() {
        fetched
            .iter()
            .map(|f| (f.alias.clone(), f.path.clone()))
            .collect()
    } else {
        ctx.endpoints()?
            .into_iter()
            .map(|endpoint| {
                let path = ctx.cert_path(&endpoint.alias);
                (endpoint.alias, path)
            })
            .collect()
    };

    if imports.is_empty() {
        bail!("No certificates to import; pass --input or run --fetch_certificates");
    }

    let settings = ctx.truststore()?;
    let keytool = require_tool(&ctx.global.keytool)?;
    let keytool = keytool.to_string_lossy();

    for (alias, path) in &imports {
        let count = update_truststore(&ctx.executor, &keytool, &settings, path, alias)
            .await
            .wrap_err_with(|| format!("Importing {} failed", path.display()))?;

        println!(
            "{} {}: {} certificates imported into {}",
            "✓".green(),
            alias.bold(),
            count,
            settings.path.display()
        );
    }

    Ok(())
}

async fn run_steps(ctx: &Context) -> Result<()> {
    let config = ctx.app_config().await?;
    info!(
        root = %config.root.display(),
        onboarding = %config.onboarding_path.display(),
        "Running steps"
    );

    let engine = PipelineEngine::new(Arc::new(ctx.executor.clone())).with_root(&config.root);
    let summary = engine
        .run(&config.onboarding)
        .await
        .map_err(|e| eyre!("{e:#}"))?;

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    for outcome in &summary.outcomes {
        let codes = outcome
            .exit_codes
            .iter()
            .map(i32::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        match outcome.status {
            StepStatus::Succeeded => println!("{} {} ({codes})", "✓".green(), outcome.name),
            StepStatus::Failed => println!("{} {} ({codes})", "!".yellow(), outcome.name),
        }
    }

    let done = format!(
        "Pipeline {}: {} steps",
        summary.pipeline_name,
        summary.outcomes.len()
    );
    if summary.all_succeeded() {
        println!("{}", done.green().bold());
    } else {
        println!("{} (some unchecked steps failed)", done.yellow().bold());
    }
}
