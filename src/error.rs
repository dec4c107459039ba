//! Error types for partyforge
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - User-friendly messages with suggestions
//! - Exit codes for CLI

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for pool operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,

    // Roster input errors (3xx)
    RosterParse = 300,
    InvalidRow = 301,

    // Assignment errors (4xx)
    InfeasibleCapacity = 400,

    // Team building errors (5xx)
    InsufficientTeamNames = 500,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI (maps to 1-125 range)
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10, // Config errors
            200..=299 => 20, // IO errors
            300..=399 => 30, // Roster input errors
            400..=499 => 40, // Assignment errors
            500..=599 => 50, // Team building errors
            900..=999 => 90, // Internal errors
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    // ─────────────────────────────────────────────────────────────
    // IO Errors
    // ─────────────────────────────────────────────────────────────

    /// File read error
    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File write error
    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Roster Input Errors
    // ─────────────────────────────────────────────────────────────

    /// Roster file could not be parsed as a whole
    #[error("Failed to parse roster {path}: {message}")]
    RosterParse { path: PathBuf, message: String },

    /// A single roster row is malformed
    #[error("Invalid row {row}{}: {reason}", row_suffix(.name))]
    InvalidRow {
        row: usize,
        name: Option<String>,
        reason: String,
    },

    // ─────────────────────────────────────────────────────────────
    // Assignment Errors
    // ─────────────────────────────────────────────────────────────

    /// The requested number of teams cannot be staffed
    #[error(
        "Infeasible capacity {requested}: {roles} needs {required} players but only {available} are eligible"
    )]
    InfeasibleCapacity {
        requested: usize,
        roles: String,
        required: usize,
        available: usize,
    },

    // ─────────────────────────────────────────────────────────────
    // Team Building Errors
    // ─────────────────────────────────────────────────────────────

    /// Not enough distinct team names to label every team
    #[error("Insufficient team names: need {required}, have {available}")]
    InsufficientTeamNames { required: usize, available: usize },

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

    /// Internal invariant violation
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    // ─────────────────────────────────────────────────────────────
    // Error Classification
    // ─────────────────────────────────────────────────────────────

    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,
            Error::Config(_) => ErrorCode::ConfigValidation,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Toml(_) => ErrorCode::ConfigParseError,
            Error::Json(_) => ErrorCode::InternalError,

            Error::RosterParse { .. } => ErrorCode::RosterParse,
            Error::InvalidRow { .. } => ErrorCode::InvalidRow,

            Error::InfeasibleCapacity { .. } => ErrorCode::InfeasibleCapacity,
            Error::InsufficientTeamNames { .. } => ErrorCode::InsufficientTeamNames,

            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Check if the error is a broken invariant rather than bad input
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Internal(_) | Error::Json(_))
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    // ─────────────────────────────────────────────────────────────
    // User-Friendly Messages
    // ─────────────────────────────────────────────────────────────

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'partyforge config init' to create a default configuration file."
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'partyforge config validate' to see details."
            ),
            Error::ConfigValidation { .. } => Some(
                "Review the configuration file and fix the invalid values."
            ),
            Error::RosterParse { .. } => Some(
                "Rosters are JSON arrays of {name, tank, dd, healer} rows or TOML files with [[player]] tables."
            ),
            Error::InvalidRow { .. } => Some(
                "Every row needs a unique, non-empty name and at least one of tank, dd or healer set to true."
            ),
            Error::InfeasibleCapacity { .. } => Some(
                "Lower --capacity or run 'partyforge capacity' to see how many teams the roster supports."
            ),
            Error::InsufficientTeamNames { .. } => Some(
                "Add more names to the team name file or the [names] list in the configuration."
            ),
            Error::Internal(_) => Some(
                "This is a bug. Please report it together with the roster and seed used."
            ),
            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let code = self.code();
        let suggestion = self.suggestion();

        let mut output = format!(
            "\x1b[31mError [{}]\x1b[0m: {}\n",
            code.as_str(),
            self
        );

        if let Some(hint) = suggestion {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }
}

/// " (name)" when the row carried a name
fn row_suffix(name: &Option<String>) -> String {
    name.as_ref().map(|n| format!(" ({})", n)).unwrap_or_default()
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Error::ConfigNotFound { path: path.into() }
    }

    /// Create a config validation error with field name
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create an invalid row error (rows are 1-based)
    pub fn invalid_row(row: usize, name: Option<&str>, reason: impl Into<String>) -> Self {
        Error::InvalidRow {
            row,
            name: name.map(str::to_string),
            reason: reason.into(),
        }
    }

    /// Create a roster parse error
    pub fn roster_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::RosterParse {
            path: path.into(),
            message: message.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
