//! Common test utilities and fixtures

#![allow(dead_code)]

use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Get a path to a specific fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

/// A `partyforge` command isolated from the user's configuration.
///
/// Runs in a fresh directory with HOME and XDG_CONFIG_HOME pointing into it
/// and no PARTYFORGE_* variables set. Keep the returned directory alive for
/// the duration of the command.
pub fn partyforge() -> (Command, TempDir) {
    let home = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("partyforge").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("RUST_LOG");
    for (key, _) in std::env::vars() {
        if key.starts_with("PARTYFORGE_") {
            cmd.env_remove(key);
        }
    }
    (cmd, home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_dir_exists() {
        assert!(fixtures_dir().exists(), "Fixtures directory should exist");
    }

    #[test]
    fn test_roster_fixtures_exist() {
        for name in ["one_team.json", "no_team.json", "guild.toml", "valid_config.toml"] {
            assert!(fixture_path(name).exists(), "{} should exist", name);
        }
    }
}
