//! Integration tests for the stepslice CLI

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use crate::helpers::{fixture_path, fixtures_dir};

/// Command for the built binary, isolated from the user's config.
fn stepslice(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("stepslice").unwrap();
    cmd.arg("--config")
        .arg(config_dir.path().join("config.toml"))
        .env_remove("RUST_LOG");
    cmd
}

fn with_empty_config() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.toml"), "").unwrap();
    dir
}

// ============================================================================
// Help Output Tests
// ============================================================================

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("stepslice")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("segment"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("jobs"));
}

#[test]
fn missing_arguments_is_usage_error() {
    Command::cargo_bin("stepslice")
        .unwrap()
        .arg("segment")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("<LOG>"));
}

// ============================================================================
// Segment Command Tests
// ============================================================================

#[test]
fn segment_prints_summary() {
    let config = with_empty_config();
    stepslice(&config)
        .arg("segment")
        .arg(fixture_path("logs/1_build.txt"))
        .arg("--workflow")
        .arg(fixture_path("ci.yml"))
        .args(["--job", "build"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Job: build (21 lines)"))
        .stdout(predicate::str::contains("4 step(s): 3 resolved, 1 unresolved"));
}

#[test]
fn segment_infers_job_from_file_name() {
    let config = with_empty_config();
    stepslice(&config)
        .arg("segment")
        .arg(fixture_path("logs/2_Deploy site.txt"))
        .arg("--workflow")
        .arg(fixture_path("ci.yml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Job: Deploy site"))
        .stdout(predicate::str::contains("1 resolved, 0 unresolved"));
}

#[test]
fn segment_without_job_uses_printed_name_for_sentinel() {
    let config = with_empty_config();
    let dir = TempDir::new().unwrap();
    let workflow = dir.path().join("ci.yml");
    std::fs::write(&workflow, "jobs:\n  build_linux:\n    steps:\n      - run: make\n").unwrap();
    let log = dir.path().join("1_build (linux).txt");
    std::fs::write(&log, "boot\nComplete job name: build (linux)\nRun make\nok\n").unwrap();

    stepslice(&config)
        .arg("segment")
        .arg(&log)
        .arg("--workflow")
        .arg(&workflow)
        .assert()
        .success()
        .stdout(predicate::str::contains("Job: build (linux) (4 lines)"))
        .stdout(predicate::str::contains("1 step(s): 1 resolved, 0 unresolved"));
}

#[test]
fn segment_json_is_parseable() {
    let config = with_empty_config();
    let output = stepslice(&config)
        .arg("segment")
        .arg(fixture_path("logs/1_build.txt"))
        .arg("--workflow")
        .arg(fixture_path("ci.yml"))
        .args(["--job", "build", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["records"].as_array().unwrap().len(), 5);
    assert_eq!(json["records"][0]["type"], "setup");
}

#[test]
fn segment_writes_artifacts_with_output() {
    let config = with_empty_config();
    let out = TempDir::new().unwrap();
    stepslice(&config)
        .arg("segment")
        .arg(fixture_path("logs/1_build.txt"))
        .arg("--workflow")
        .arg(fixture_path("ci.yml"))
        .args(["--job", "build", "--output"])
        .arg(out.path())
        .assert()
        .success();

    let job_dir = out.path().join("build");
    assert!(job_dir.join("segmentation.json").exists());
    assert!(job_dir.join("03_Test.log").exists());
}

#[test]
fn segment_missing_log_exits_1() {
    let config = with_empty_config();
    stepslice(&config)
        .arg("segment")
        .arg(fixtures_dir().join("logs/nope.txt"))
        .arg("--workflow")
        .arg(fixture_path("ci.yml"))
        .args(["--job", "build"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

// ============================================================================
// Batch / Jobs / Config Command Tests
// ============================================================================

#[test]
fn batch_from_logs_dir_writes_summary() {
    let config = with_empty_config();
    let out = TempDir::new().unwrap();
    stepslice(&config)
        .arg("batch")
        .arg("--logs-dir")
        .arg(fixtures_dir().join("logs"))
        .arg("--workflow")
        .arg(fixture_path("ci.yml"))
        .arg("--output")
        .arg(out.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2 job(s) segmented, 0 skipped"));

    assert!(out.path().join("summary.json").exists());
}

#[test]
fn batch_logs_dir_without_workflow_is_usage_error() {
    let config = with_empty_config();
    stepslice(&config)
        .arg("batch")
        .arg("--logs-dir")
        .arg(fixtures_dir().join("logs"))
        .assert()
        .code(2);
}

#[test]
fn jobs_lists_identifiers() {
    let config = with_empty_config();
    stepslice(&config)
        .arg("jobs")
        .arg(fixture_path("ci.yml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("deploy (Deploy site)"))
        .stdout(predicate::str::contains("Test -> Run cargo test --all"));
}

#[test]
fn config_init_then_show() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    Command::cargo_bin("stepslice")
        .unwrap()
        .args(["config", "init", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));

    Command::cargo_bin("stepslice")
        .unwrap()
        .args(["config", "show", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("sentinel_prefix = \"Complete job name: \""));
}
