//! Configuration for partyforge
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (PARTYFORGE_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::output::OutputFormat;
use crate::solver::AssignmentPolicy;
use crate::teams::NamePool;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Team formation settings
    pub pool: PoolSettings,

    /// Team name source
    pub names: NameSettings,

    /// Result rendering
    pub output: OutputSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Team formation settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Random seed (unset = nondeterministic)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Give the first 4k people of the roster precedence
    pub prefer_input_order: bool,

    /// Force this many teams instead of the computed maximum
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,

    /// How roles are chosen among equally good assignments
    pub policy: AssignmentPolicy,

    /// Load rows with no role instead of rejecting them
    pub allow_ineligible: bool,
}

/// Team name source. A file wins over the inline list; with neither, the
/// built-in list is used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NameSettings {
    /// File with one team name per line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Inline team names
    pub list: Vec<String>,
}

/// Output settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// text or json
    pub format: OutputFormat,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
            max_files: 5,
            json_format: false,
        }
    }
}

impl NameSettings {
    /// Build the name pool this configuration describes.
    pub fn name_pool(&self) -> Result<NamePool> {
        if let Some(ref file) = self.file {
            return NamePool::from_file(Path::new(file));
        }
        if !self.list.is_empty() {
            return NamePool::from_names(self.list.iter().cloned());
        }
        Ok(NamePool::builtin())
    }
}

impl PoolConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        // 1. Load from config file if it exists
        if let Some(path) = Self::find_config_file(config_path)? {
            debug!(path = %path.display(), "Loading configuration file");
            config = Self::from_file(&path)?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        // 2. Apply environment variable overrides
        config.apply_env_overrides();

        // 3. Expand paths
        config.expand_paths();

        // 4. Validate
        config.validate()?;

        Ok(config)
    }

    /// Parse a configuration file without overrides or validation
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::IoRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse {
            message: format!("{}: {}", path.display(), e.message()),
            source: Some(e),
        })
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        // If explicit path provided, use it (error if not found)
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            if path.exists() {
                return Ok(Some(path));
            }
            return Err(Error::config_not_found(path));
        }

        // Search in standard locations
        let search_paths = [
            // Current directory
            Some(PathBuf::from("partyforge.toml")),
            // User config directory
            dirs::config_dir().map(|p| p.join("partyforge").join("config.toml")),
            // Home directory
            dirs::home_dir().map(|p| p.join(".partyforge").join("config.toml")),
        ];

        for path in search_paths.iter().flatten() {
            if path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // Pool settings
        if let Ok(val) = std::env::var("PARTYFORGE_SEED") {
            if let Ok(n) = val.parse() {
                self.pool.seed = Some(n);
            }
        }
        if let Ok(val) = std::env::var("PARTYFORGE_PREFER_INPUT_ORDER") {
            self.pool.prefer_input_order = parse_flag(&val);
        }
        if let Ok(val) = std::env::var("PARTYFORGE_CAPACITY") {
            if let Ok(n) = val.parse() {
                self.pool.capacity = Some(n);
            }
        }
        if let Ok(val) = std::env::var("PARTYFORGE_POLICY") {
            if let Ok(policy) = AssignmentPolicy::from_str(&val, true) {
                self.pool.policy = policy;
            }
        }
        if let Ok(val) = std::env::var("PARTYFORGE_ALLOW_INELIGIBLE") {
            self.pool.allow_ineligible = parse_flag(&val);
        }

        // Names
        if let Ok(val) = std::env::var("PARTYFORGE_NAMES_FILE") {
            self.names.file = Some(val);
        }

        // Output
        if let Ok(val) = std::env::var("PARTYFORGE_FORMAT") {
            if let Ok(format) = OutputFormat::from_str(&val, true) {
                self.output.format = format;
            }
        }

        // Logging settings
        if let Ok(val) = std::env::var("PARTYFORGE_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("PARTYFORGE_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("PARTYFORGE_LOG_JSON") {
            self.logging.json_format = parse_flag(&val);
        }
    }

    /// Expand ~ and other path variables
    fn expand_paths(&mut self) {
        if let Some(ref file) = self.names.file {
            self.names.file = Some(expand_path(file));
        }
        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        // Duplicate or blank inline names
        if !self.names.list.is_empty() {
            NamePool::from_names(self.names.list.iter().cloned())?;
        }

        if matches!(self.names.file.as_deref(), Some(f) if f.trim().is_empty()) {
            return Err(Error::config_field_invalid(
                "names.file",
                "Team name file path cannot be empty",
            ));
        }

        Ok(())
    }
}

fn parse_flag(val: &str) -> bool {
    val.eq_ignore_ascii_case("true") || val == "1"
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file, returning where it was written
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("partyforge")
                .join("config.toml")
        });

    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(&config_path, generate_default_config()).map_err(|e| Error::IoWrite {
        path: config_path.clone(),
        source: e,
    })?;

    Ok(config_path)
}

/// Generate default configuration content with comments
pub fn generate_default_config() -> String {
    r#"# partyforge configuration

[pool]
# Random seed; leave unset for a different draw every run
# seed = 42

# Give the first 4k people of the roster precedence when breaking ties
prefer_input_order = false

# Force this many teams instead of the computed maximum
# capacity = 3

# Assignment policy: uniform, fewest-roles-first
policy = "uniform"

# Load roster rows without any role (they end up as leftovers)
allow_ineligible = false

[names]
# File with one team name per line ('#' starts a comment)
# file = "~/.partyforge/team-names.txt"

# Inline team names, used when no file is set
list = []

[output]
# Output format: text, json
format = "text"

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log file path (comment out to disable file logging)
# file = "~/.partyforge/logs/partyforge.log"

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#
    .to_string()
}
