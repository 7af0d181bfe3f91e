//! Step execution engine (`pipeline --run`).
//!
//! The PipelineEngine executes the onboarding `steps` sequentially,
//! delegating every command to a [`CommandRunner`].

use crate::executor::Command;
use crate::executor::CommandRunner;
use crate::executor::RunOptions;
use crate::validate::validate_onboarding;
use anyhow::anyhow;
use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use pipeline_protocol::onboarding_models::ExecMode;
use pipeline_protocol::onboarding_models::Onboarding;
use pipeline_protocol::onboarding_models::Step;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing::warn;

/// Final state of an executed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Succeeded,
    /// Exited non-zero without `check`; the run continued.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub name: String,
    /// One code per command; several for parallel steps.
    pub exit_codes: Vec<i32>,
    pub status: StepStatus,
}

/// Outcome of every step that ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub pipeline_name: String,
    pub outcomes: Vec<StepOutcome>,
}

impl RunSummary {
    pub fn all_succeeded(&self) -> bool {
        self.outcomes
            .iter()
            .all(|outcome| outcome.status == StepStatus::Succeeded)
    }
}

/// The step execution engine.
pub struct PipelineEngine {
    runner: Arc<dyn CommandRunner>,
    root: PathBuf,
}

impl PipelineEngine {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            root: PathBuf::from("."),
        }
    }

    /// Project root the document is validated against.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Execute every step of the onboarding document in order.
    ///
    /// # Errors
    ///
    /// Returns an error before anything runs if the document has
    /// validation errors. Otherwise returns an error naming the step if:
    /// - A step command cannot be spawned
    /// - A step with `check` enabled exits non-zero
    pub async fn run(&self, onboarding: &Onboarding) -> Result<RunSummary> {
        let report = validate_onboarding(onboarding, &self.root);
        if !report.is_valid() {
            let errors = report
                .errors()
                .map(|issue| format!("  {issue}"))
                .collect::<Vec<_>>()
                .join("\n");
            bail!("Pipeline '{}' is invalid:\n{errors}", onboarding.name);
        }

        let total = onboarding.steps.len();
        info!(pipeline = %onboarding.name, steps = total, "Running pipeline");

        let mut summary = RunSummary {
            pipeline_name: onboarding.name.clone(),
            outcomes: Vec::with_capacity(total),
        };

        for (index, step) in onboarding.steps.iter().enumerate() {
            info!("Step {}/{total}: {}", index + 1, step.name);

            let outcome = if step.is_parallel() {
                self.run_parallel_step(step).await
            } else {
                self.run_command_step(step).await
            }
            .with_context(|| format!("Step '{}' failed", step.name))?;

            summary.outcomes.push(outcome);
        }

        info!(pipeline = %onboarding.name, "Pipeline finished");
        Ok(summary)
    }

    async fn run_command_step(&self, step: &Step) -> Result<StepOutcome> {
        let raw = step
            .command
            .as_deref()
            .ok_or_else(|| anyhow!("step has neither `command` nor `parallel`"))?;
        let command = Command::from_shell(raw)?;

        let mut options = RunOptions::new()
            .with_mode(step.mode)
            .hidden(step.hidden)
            .checked(step.check);
        if let (Some(stdin), ExecMode::Normal) = (&step.stdin, step.mode) {
            options = options.with_stdin(stdin.as_str());
        }

        let answer = self.runner.run(command, options).await?;

        let status = if answer.success() {
            StepStatus::Succeeded
        } else {
            warn!(
                "Step '{}' exited with code {}; continuing because check is disabled",
                step.name, answer.exit_code
            );
            StepStatus::Failed
        };

        Ok(StepOutcome {
            name: step.name.clone(),
            exit_codes: vec![answer.exit_code],
            status,
        })
    }

    async fn run_parallel_step(&self, step: &Step) -> Result<StepOutcome> {
        // Parse everything up front so a bad entry spawns nothing.
        let commands = step
            .parallel
            .iter()
            .map(|raw| Command::from_shell(raw.as_str()))
            .collect::<Result<Vec<_>, _>>()?;

        let answers = self.runner.run_parallel(commands).await?;
        let exit_codes: Vec<i32> = answers.iter().map(|a| a.result.exit_code).collect();

        let failures: Vec<String> = answers
            .iter()
            .filter(|a| !a.result.success())
            .map(|a| format!("{} (exit {})", a.result.command, a.result.exit_code))
            .collect();

        let status = if failures.is_empty() {
            StepStatus::Succeeded
        } else if step.check {
            bail!(
                "{} of {} parallel commands failed: {}",
                failures.len(),
                answers.len(),
                failures.join(", ")
            );
        } else {
            warn!(
                "Step '{}': {} parallel commands failed; continuing because check is disabled",
                step.name,
                failures.len()
            );
            StepStatus::Failed
        };

        Ok(StepOutcome {
            name: step.name.clone(),
            exit_codes,
            status,
        })
    }
}
