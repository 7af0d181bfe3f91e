//! End-to-end tests for the `pipeline` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::{tempdir, TempDir};

const VALID: &str = r#"name: payments-service
owner: team-payments
steps:
  - name: greet
    command: "echo hello"
  - name: marker
    command: "touch ran.txt"
"#;

fn project(onboarding: &str) -> TempDir {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("onboarding.yaml"), onboarding).unwrap();
    dir
}

fn pipeline(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pipeline").unwrap();
    cmd.arg("-C").arg(dir.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_no_action_prints_usage() {
    Command::cargo_bin("pipeline")
        .unwrap()
        .assert()
        .success()
        .stdout(predicate::str::contains("--fetch_certificates"))
        .stdout(predicate::str::contains("--validate"));
}

#[test]
fn test_unknown_option_is_usage_error() {
    Command::cargo_bin("pipeline")
        .unwrap()
        .arg("--bogus")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_validate_valid_document() {
    let dir = project(VALID);

    pipeline(&dir)
        .arg("--validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"));
}

#[test]
fn test_validate_invalid_document() {
    let dir = project("name: svc\nsteps:\n  - name: empty\n");

    pipeline(&dir)
        .arg("--validate")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("steps[0]"))
        .stdout(predicate::str::contains("is invalid"));
}

#[test]
fn test_validate_missing_document() {
    let dir = tempdir().unwrap();

    Command::cargo_bin("pipeline")
        .unwrap()
        .arg("-C")
        .arg(dir.path())
        .arg("--validate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("onboarding.yaml"));
}

#[test]
fn test_onboarding_flag_selects_file() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("other.yaml"), VALID).unwrap();

    pipeline(&dir)
        .args(["-f", "other.yaml", "--validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("other.yaml is valid"));
}

#[test]
fn test_init_writes_metadata() {
    let dir = project(VALID);

    pipeline(&dir)
        .arg("--init")
        .assert()
        .success()
        .stdout(predicate::str::contains("payments-service"));

    let raw = fs::read_to_string(dir.path().join(".pipeline/metadata.json")).unwrap();
    let metadata: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(metadata["name"], "payments-service");
    assert_eq!(metadata["steps"], serde_json::json!(["greet", "marker"]));

    pipeline(&dir).arg("--init").assert().code(1);
    pipeline(&dir).args(["--init", "--force"]).assert().success();
}

#[test]
fn test_global_config_moves_metadata() {
    let dir = project(VALID);
    fs::write(dir.path().join("pipeline.toml"), "metadata-dir = \"meta\"\n").unwrap();

    pipeline(&dir).arg("--init").assert().success();

    assert!(dir.path().join("meta/metadata.json").exists());
}

#[test]
fn test_run_executes_steps_in_project_dir() {
    let dir = project(VALID);

    pipeline(&dir)
        .arg("--run")
        .assert()
        .success()
        .stdout(predicate::str::contains("greet"))
        .stdout(predicate::str::contains("Pipeline payments-service: 2 steps"));

    assert!(dir.path().join("ran.txt").exists());
}

#[test]
fn test_run_failure_names_step() {
    let dir = project("name: svc\nsteps:\n  - name: broken\n    command: \"false\"\n");

    pipeline(&dir)
        .arg("--run")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Step 'broken' failed"));
}

#[test]
fn test_invalid_document_stops_later_actions() {
    let dir = project("name: svc\nsteps:\n  - name: empty\n");

    pipeline(&dir).args(["--run", "--validate"]).assert().code(1);

    assert!(!dir.path().join(".pipeline").exists());
}

#[test]
fn test_run_rejects_invalid_document() {
    let dir = project(
        "name: svc\nsteps:\n  - name: both\n    command: \"touch dropped.txt\"\n    parallel: [\"touch ran.txt\"]\n",
    );

    pipeline(&dir)
        .arg("--run")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("mutually exclusive"));

    assert!(!dir.path().join("ran.txt").exists());
    assert!(!dir.path().join("dropped.txt").exists());
}

#[test]
fn test_backup_with_truststore_flag() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("store.jks");
    fs::write(&store, b"store-bytes").unwrap();
    let output = dir.path().join("copy.jks");

    pipeline(&dir)
        .arg("--backup_truststore")
        .arg("-t")
        .arg(&store)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    assert_eq!(fs::read(&output).unwrap(), b"store-bytes");
}

#[test]
fn test_backup_without_truststore_fails() {
    let dir = project(VALID);

    pipeline(&dir)
        .arg("--backup_truststore")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No truststore configured"));
}

#[test]
fn test_invalid_url_target() {
    let dir = project(VALID);

    pipeline(&dir)
        .args(["--fetch_certificates", "-u", "https://"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid endpoint target"));
}
