//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for partyforge.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use crate::solver::AssignmentPolicy;

/// partyforge - Form tank/dd/healer teams from a roster
///
/// Reads a roster of players and the roles each can play, forms as many
/// complete teams (1 tank, 2 dd, 1 healer) as possible and reports who is
/// left over.
#[derive(Parser, Debug)]
#[command(name = "partyforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Form teams from a roster and print them with the leftovers
    Form {
        /// Roster file (.json or .toml)
        #[arg(short, long)]
        roster: PathBuf,

        /// Path to configuration file
        #[arg(short, long, env = "PARTYFORGE_CONFIG")]
        config: Option<String>,

        /// Random seed for a reproducible draw
        #[arg(short, long, env = "PARTYFORGE_SEED")]
        seed: Option<u64>,

        /// Form exactly this many teams instead of the maximum
        #[arg(short = 'k', long)]
        capacity: Option<usize>,

        /// Give the first 4k roster entries precedence
        #[arg(long)]
        prefer_input_order: bool,

        /// File with one team name per line
        #[arg(short, long)]
        names: Option<PathBuf>,

        /// Assignment policy
        #[arg(short, long, value_enum)]
        policy: Option<AssignmentPolicy>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Accept roster rows without any role
        #[arg(long)]
        allow_ineligible: bool,
    },

    /// Show how many teams a roster supports without forming them
    Capacity {
        /// Roster file (.json or .toml)
        #[arg(short, long)]
        roster: PathBuf,

        /// Path to configuration file
        #[arg(short, long, env = "PARTYFORGE_CONFIG")]
        config: Option<String>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Accept roster rows without any role
        #[arg(long)]
        allow_ineligible: bool,
    },

    /// Display version and build information
    Version,

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the effective configuration
    Show {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_form_defaults() {
        let cli = Cli::parse_from(["partyforge", "form", "--roster", "roster.json"]);
        match cli.command {
            Commands::Form {
                roster,
                capacity,
                prefer_input_order,
                policy,
                format,
                ..
            } => {
                assert_eq!(roster, PathBuf::from("roster.json"));
                assert!(capacity.is_none());
                assert!(!prefer_input_order);
                assert!(policy.is_none());
                assert!(format.is_none());
            }
            _ => panic!("Expected Form command"),
        }
    }

    #[test]
    fn test_form_with_options() {
        let cli = Cli::parse_from([
            "partyforge",
            "form",
            "-r",
            "roster.toml",
            "--seed",
            "42",
            "-k",
            "2",
            "--prefer-input-order",
            "--policy",
            "fewest-roles-first",
            "--format",
            "json",
            "--names",
            "names.txt",
        ]);
        match cli.command {
            Commands::Form {
                seed,
                capacity,
                prefer_input_order,
                policy,
                format,
                names,
                ..
            } => {
                assert_eq!(seed, Some(42));
                assert_eq!(capacity, Some(2));
                assert!(prefer_input_order);
                assert_eq!(policy, Some(AssignmentPolicy::FewestRolesFirst));
                assert_eq!(format, Some(OutputFormat::Json));
                assert_eq!(names, Some(PathBuf::from("names.txt")));
            }
            _ => panic!("Expected Form command"),
        }
    }

    #[test]
    fn test_form_requires_roster() {
        assert!(Cli::try_parse_from(["partyforge", "form"]).is_err());
    }

    #[test]
    fn test_rejects_unknown_policy() {
        let result = Cli::try_parse_from([
            "partyforge",
            "form",
            "-r",
            "roster.json",
            "--policy",
            "random",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_capacity_command() {
        let cli = Cli::parse_from(["partyforge", "capacity", "--roster", "r.json"]);
        match cli.command {
            Commands::Capacity { roster, .. } => assert_eq!(roster, PathBuf::from("r.json")),
            _ => panic!("Expected Capacity command"),
        }
    }

    #[test]
    fn test_verbose_flags() {
        let cli = Cli::parse_from(["partyforge", "-vv", "version"]);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_quiet_flag() {
        let cli = Cli::parse_from(["partyforge", "--quiet", "version"]);
        assert!(cli.quiet);
    }

    #[test]
    fn test_config_init() {
        let cli = Cli::parse_from(["partyforge", "config", "init", "--force"]);
        match cli.command {
            Commands::Config {
                subcommand: ConfigSubcommand::Init { path, force },
            } => {
                assert!(path.is_none());
                assert!(force);
            }
            _ => panic!("Expected Config Init command"),
        }
    }
}
