//! Integration tests for the surge CLI skeleton
//!
//! These tests verify the CLI structure and argument parsing.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn surge() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("surge"));
    cmd.env("RUST_LOG", "warn");
    cmd
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help() {
    // clap with arg_required_else_help shows help on stderr and exits 2
    surge().assert().code(2).stderr(predicate::str::contains(
        "Plan runner for distributed load tests",
    ));
}

#[test]
fn test_cli_help_flag_shows_help() {
    surge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("stage"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    surge()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("surge"));
}

#[test]
fn test_version_command_shows_version() {
    surge()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "surge {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let output = surge()
        .arg("version")
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&output).expect("valid JSON");
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

// --- Stage listing ---

#[test]
fn test_stages_lists_pipeline_in_order() {
    let output = surge().arg("stages").assert().success().get_output().stdout.clone();
    let text = String::from_utf8(output).expect("utf8");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 9);
    assert!(lines[0].ends_with("populate_missing_instances"));
    assert!(lines[8].ends_with("check_drained"));
}

#[test]
fn test_stages_json_is_array_of_names() {
    let output = surge()
        .args(["stages", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&output).expect("valid JSON");
    let names = value.as_array().expect("array");
    assert_eq!(names.len(), 9);
    assert_eq!(names[6], "check_for_cluster_done");
}

// --- Argument errors ---

#[test]
fn test_json_flag_help_names_affected_commands() {
    surge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("JSON output (version, stages;"));
}

#[test]
fn test_unknown_stage_lists_valid_stages() {
    surge()
        .args(["stage", "launch_rockets"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown stage"))
        .stderr(predicate::str::contains("cleanup_cluster"));
}

#[test]
fn test_unknown_subcommand_fails() {
    surge().arg("deploy").assert().code(2);
}

#[test]
fn test_unsupported_plan_format_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("plan.ini");
    std::fs::write(&path, "cluster_name = x").expect("write");
    surge()
        .args(["validate", "--plan"])
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unsupported plan format"));
}
