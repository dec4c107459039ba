//! Roster loading from tabular files
//!
//! A roster file is a table of rows with a name and three eligibility flags.
//! Two encodings are accepted, chosen by file extension:
//!
//! - `.json`: an array of `{"name": .., "tank": .., "dd": .., "healer": ..}`
//! - `.toml`: `[[player]]` tables with the same keys
//!
//! Rows are validated one by one and the first bad row aborts the load.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use super::types::{Player, RoleSet, Roster};
use crate::error::{Error, Result};

/// One raw row as it appears in the file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RosterRow {
    #[serde(alias = "Name")]
    pub name: Option<String>,
    #[serde(alias = "Tank")]
    pub tank: bool,
    #[serde(alias = "DD", alias = "dps")]
    pub dd: bool,
    #[serde(alias = "Healer", alias = "heal")]
    pub healer: bool,
}

#[derive(Debug, Deserialize)]
struct TomlRoster {
    #[serde(default)]
    player: Vec<RosterRow>,
}

/// Supported roster encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterFormat {
    Json,
    Toml,
}

impl RosterFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("json") => Ok(RosterFormat::Json),
            Some("toml") => Ok(RosterFormat::Toml),
            other => Err(Error::roster_parse(
                path,
                format!(
                    "unsupported roster format '{}' (use .json or .toml)",
                    other.unwrap_or("")
                ),
            )),
        }
    }
}

/// Loads rosters and applies row validation
#[derive(Debug, Clone, Default)]
pub struct RosterLoader {
    /// Accept rows with no role selected; such players always end up leftover
    allow_ineligible: bool,
}

impl RosterLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_ineligible(mut self, allow: bool) -> Self {
        self.allow_ineligible = allow;
        self
    }

    /// Read and validate a roster file
    pub fn load_file(&self, path: &Path) -> Result<Roster> {
        let format = RosterFormat::from_path(path)?;
        debug!(path = %path.display(), ?format, "Loading roster");

        let content = fs::read_to_string(path).map_err(|e| Error::IoRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let rows = parse_rows(&content, format).map_err(|message| Error::roster_parse(path, message))?;
        let roster = self.from_rows(rows)?;

        info!(
            path = %path.display(),
            players = roster.len(),
            "Roster loaded"
        );
        Ok(roster)
    }

    /// Validate rows into a roster. Row numbers in errors are 1-based.
    pub fn from_rows(&self, rows: impl IntoIterator<Item = RosterRow>) -> Result<Roster> {
        let mut roster = Roster::new();

        for (idx, row) in rows.into_iter().enumerate() {
            let row_no = idx + 1;
            let name = row
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .ok_or_else(|| Error::invalid_row(row_no, None, "missing name"))?;

            let roles = RoleSet::from_flags(row.tank, row.dd, row.healer);
            if roles.is_empty() && !self.allow_ineligible {
                return Err(Error::invalid_row(row_no, Some(name), "no role selected"));
            }

            roster.push(Player::new(name, roles))?;
        }

        Ok(roster)
    }
}

fn parse_rows(content: &str, format: RosterFormat) -> std::result::Result<Vec<RosterRow>, String> {
    match format {
        RosterFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        RosterFormat::Toml => toml::from_str::<TomlRoster>(content)
            .map(|r| r.player)
            .map_err(|e| e.to_string()),
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
