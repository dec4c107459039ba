//! Configuration system tests
//!
//! Tests configuration loading, validation, and environment overrides
//! through the binary

mod common;

use std::fs;

use predicates::prelude::*;

use common::{fixture_path, partyforge};

#[test]
fn test_valid_config_fixture() {
    let (mut cmd, _home) = partyforge();
    cmd.args(["config", "validate", "--config"])
        .arg(fixture_path("valid_config.toml"))
        .assert()
        .success();
}

#[test]
fn test_invalid_log_level() {
    let (mut cmd, _home) = partyforge();
    cmd.args(["config", "validate", "--config"])
        .arg(fixture_path("invalid_config.toml"))
        .assert()
        .code(10)
        .stderr(predicate::str::contains("log level"));
}

#[test]
fn test_duplicate_team_names_rejected() {
    let (mut cmd, _home) = partyforge();
    cmd.args(["config", "validate", "--config"])
        .arg(fixture_path("duplicate_names_config.toml"))
        .assert()
        .code(10)
        .stderr(predicate::str::contains("duplicate team name"));
}

#[test]
fn test_syntax_error() {
    let (mut cmd, home) = partyforge();
    let path = home.path().join("broken.toml");
    fs::write(&path, "[pool\nseed = 1").unwrap();

    cmd.args(["config", "validate", "--config"])
        .arg(&path)
        .assert()
        .code(10)
        .stderr(predicate::str::contains("E101"));
}

#[test]
fn test_config_in_working_directory_is_found() {
    let (mut cmd, home) = partyforge();
    fs::write(
        home.path().join("partyforge.toml"),
        "[pool]\nseed = 99\nprefer_input_order = true\n",
    )
    .unwrap();

    cmd.args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("seed = 99"))
        .stdout(predicate::str::contains("prefer_input_order = true"));
}

#[test]
fn test_env_overrides_file() {
    let (mut cmd, home) = partyforge();
    fs::write(home.path().join("partyforge.toml"), "[pool]\nseed = 1\n").unwrap();

    cmd.args(["config", "show"])
        .env("PARTYFORGE_SEED", "5")
        .env("PARTYFORGE_POLICY", "fewest-roles-first")
        .assert()
        .success()
        .stdout(predicate::str::contains("seed = 5"))
        .stdout(predicate::str::contains("policy = \"fewest-roles-first\""));
}

#[test]
fn test_config_drives_form() {
    let (mut cmd, _home) = partyforge();
    let output = cmd
        .args(["form", "--roster"])
        .arg(fixture_path("one_team.json"))
        .arg("--config")
        .arg(fixture_path("valid_config.toml"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let name = value["teams"][0]["name"].as_str().unwrap();
    assert!(["Otters", "Badgers", "Ravens"].contains(&name));
}
