//! Onboarding document validation (`pipeline --validate`).
//!
//! Parsing already guarantees the document's shape; this module checks the
//! rules serde cannot express: naming, uniqueness, cross-section
//! requirements and that every step command can actually be executed.

use crate::executor::Command;
use pipeline_protocol::onboarding_models::ExecMode;
use pipeline_protocol::onboarding_models::Onboarding;
use pipeline_protocol::onboarding_models::Step;
use pipeline_protocol::onboarding_models::TruststoreConfig;
use pipeline_protocol::onboarding_models::SUPPORTED_STORE_TYPES;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// A single finding, addressed by its field path (e.g. `steps[1].command`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.field, self.message)
    }
}

/// All findings for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// True when there are no errors. Warnings do not affect validity.
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Warning)
    }

    fn error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Error, field, message);
    }

    fn warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Warning, field, message);
    }

    fn push(&mut self, severity: Severity, field: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            severity,
            field: field.into(),
            message: message.into(),
        });
    }
}

/// Validate an onboarding document.
///
/// `root` is the project root; the truststore path is resolved against it
/// to check for existence.
pub fn validate_onboarding(doc: &Onboarding, root: &Path) -> ValidationReport {
    let mut report = ValidationReport::default();

    check_name(doc, &mut report);
    check_endpoints(doc, &mut report);

    if let Some(truststore) = &doc.truststore {
        check_truststore(truststore, root, &mut report);
    }

    check_steps(&doc.steps, &mut report);

    report
}

fn check_name(doc: &Onboarding, report: &mut ValidationReport) {
    if doc.name.trim().is_empty() {
        report.error("name", "must not be empty");
    } else if !doc
        .name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        report.error(
            "name",
            format!(
                "{:?} may only contain letters, digits, '.', '_' and '-'",
                doc.name
            ),
        );
    }
}

fn check_endpoints(doc: &Onboarding, report: &mut ValidationReport) {
    if !doc.endpoints.is_empty() && doc.truststore.is_none() {
        report.error("truststore", "is required when endpoints are defined");
    }

    let mut aliases = HashSet::new();
    for (i, endpoint) in doc.endpoints.iter().enumerate() {
        let field = format!("endpoints[{i}]");

        if endpoint.alias.trim().is_empty() {
            report.error(format!("{field}.alias"), "must not be empty");
        } else if !aliases.insert(endpoint.alias.as_str()) {
            report.error(
                format!("{field}.alias"),
                format!("duplicate alias {:?}", endpoint.alias),
            );
        }

        if endpoint.host.trim().is_empty() {
            report.error(format!("{field}.host"), "must not be empty");
        }

        if endpoint.port == 0 {
            report.error(format!("{field}.port"), "must be between 1 and 65535");
        }
    }
}

fn check_truststore(truststore: &TruststoreConfig, root: &Path, report: &mut ValidationReport) {
    if truststore.path.as_os_str().is_empty() {
        report.error("truststore.path", "must not be empty");
    } else if !root.join(&truststore.path).exists() {
        report.warning(
            "truststore.path",
            format!(
                "{} does not exist yet; it will be created on first update",
                truststore.path.display()
            ),
        );
    }

    if !SUPPORTED_STORE_TYPES.contains(&truststore.store_type.as_str()) {
        report.error(
            "truststore.store-type",
            format!(
                "unsupported store type {:?}; expected one of {}",
                truststore.store_type,
                SUPPORTED_STORE_TYPES.join(", ")
            ),
        );
    }

    if truststore.password_env.trim().is_empty() {
        report.error("truststore.password-env", "must not be empty");
    } else if std::env::var_os(&truststore.password_env).is_none() {
        report.warning(
            "truststore.password-env",
            format!("environment variable {} is not set", truststore.password_env),
        );
    }
}

fn check_steps(steps: &[Step], report: &mut ValidationReport) {
    let mut names = HashSet::new();

    for (i, step) in steps.iter().enumerate() {
        let field = format!("steps[{i}]");

        if step.name.trim().is_empty() {
            report.error(format!("{field}.name"), "must not be empty");
        } else if !names.insert(step.name.as_str()) {
            report.error(
                format!("{field}.name"),
                format!("duplicate step name {:?}", step.name),
            );
        }

        match (&step.command, step.is_parallel()) {
            (None, false) => {
                report.error(field.as_str(), "needs either `command` or `parallel`");
            }
            (Some(_), true) => {
                report.error(field.as_str(), "`command` and `parallel` are mutually exclusive");
            }
            (Some(command), false) => {
                check_command(command, &format!("{field}.command"), report);
                if step.stdin.is_some() && step.mode == ExecMode::Call {
                    report.warning(format!("{field}.stdin"), "is ignored in call mode");
                }
            }
            (None, true) => {
                for (j, command) in step.parallel.iter().enumerate() {
                    check_command(command, &format!("{field}.parallel[{j}]"), report);
                }
                if step.mode == ExecMode::Call {
                    report.warning(format!("{field}.mode"), "is ignored for parallel steps");
                }
                if step.stdin.is_some() {
                    report.warning(format!("{field}.stdin"), "is ignored for parallel steps");
                }
                if step.hidden {
                    report.warning(format!("{field}.hidden"), "is ignored for parallel steps");
                }
            }
        }
    }
}

fn check_command(command: &str, field: &str, report: &mut ValidationReport) {
    if let Err(e) = Command::from_shell(command) {
        report.error(field, e.to_string());
    }
}
