//! CLI integration tests
//!
//! Tests the command-line interface using assert_cmd

mod common;

use predicates::prelude::*;

use common::partyforge;

// ─────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    let (mut cmd, _home) = partyforge();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("form"))
        .stdout(predicate::str::contains("capacity"))
        .stdout(predicate::str::contains("version"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_form_help_lists_options() {
    let (mut cmd, _home) = partyforge();
    cmd.args(["form", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--roster"))
        .stdout(predicate::str::contains("--seed"))
        .stdout(predicate::str::contains("--prefer-input-order"))
        .stdout(predicate::str::contains("fewest-roles-first"));
}

#[test]
fn test_version_command() {
    let (mut cmd, _home) = partyforge();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("partyforge"))
        .stdout(predicate::str::contains("source:"))
        .stdout(predicate::str::contains("uniform tables up to"));
}

#[test]
fn test_short_version_flag() {
    let (mut cmd, _home) = partyforge();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("partyforge"));
}

#[test]
fn test_unknown_command_fails() {
    let (mut cmd, _home) = partyforge();
    cmd.arg("shuffle").assert().failure();
}

// ─────────────────────────────────────────────────────────────────
// Config Command Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_config_show_default() {
    let (mut cmd, _home) = partyforge();
    cmd.args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[pool]"))
        .stdout(predicate::str::contains("policy = \"uniform\""))
        .stdout(predicate::str::contains("[names]"))
        .stdout(predicate::str::contains("[logging]"));
}

#[test]
fn test_config_validate_default() {
    let (mut cmd, _home) = partyforge();
    cmd.args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_config_validate_nonexistent_file() {
    let (mut cmd, _home) = partyforge();
    cmd.args(["config", "validate", "--config", "/nonexistent/path/config.toml"])
        .assert()
        .code(10)
        .stderr(predicate::str::contains("E100"));
}

#[test]
fn test_config_init_then_validate() {
    let (mut cmd, home) = partyforge();
    let path = home.path().join("partyforge.toml");
    cmd.args(["config", "init", "--path"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file created"));
    assert!(path.exists());

    let (mut cmd, _other) = partyforge();
    cmd.args(["config", "validate", "--config"])
        .arg(&path)
        .assert()
        .success();
}

#[test]
fn test_config_init_refuses_overwrite() {
    let (mut cmd, home) = partyforge();
    let path = home.path().join("existing.toml");
    std::fs::write(&path, "").unwrap();

    cmd.args(["config", "init", "--path"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}
