//! partyforge - tank/dd/healer team formation
//!
//! Entry point for the `partyforge` binary. Results go to stdout, logs and
//! errors to stderr.

mod cli;
mod config;
mod error;
mod logging;
mod output;
mod pool;
mod roster;
mod solver;
mod teams;
mod version;

use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, error, info};

use crate::cli::{Cli, Commands, ConfigSubcommand};
use crate::config::PoolConfig;
use crate::error::Result;
use crate::output::OutputFormat;
use crate::pool::PoolOrchestrator;
use crate::roster::RosterLoader;
use crate::solver::{analyze, AssignmentPolicy};

fn main() {
    // Parse CLI arguments first (before logging, so we know verbosity)
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        if e.is_fatal() {
            error!(code = %e.code(), "Run aborted on a broken invariant");
        }
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Version => {
            version::print_version();
            Ok(())
        }
        Commands::Config { subcommand } => handle_config_command(subcommand),
        Commands::Form {
            roster,
            config,
            seed,
            capacity,
            prefer_input_order,
            names,
            policy,
            format,
            allow_ineligible,
        } => {
            let mut cfg = PoolConfig::load(config.as_deref())?;
            let _log_guards = logging::init_logging(&cfg.logging, cli.verbose, cli.quiet)?;
            log_startup();

            // CLI arguments take precedence over file and environment
            let overrides = FormOverrides {
                seed,
                capacity,
                prefer_input_order,
                names,
                policy,
                format,
                allow_ineligible,
            };
            overrides.apply(&mut cfg);

            form_teams(&roster, &cfg)
        }
        Commands::Capacity {
            roster,
            config,
            format,
            allow_ineligible,
        } => {
            let mut cfg = PoolConfig::load(config.as_deref())?;
            let _log_guards = logging::init_logging(&cfg.logging, cli.verbose, cli.quiet)?;
            log_startup();

            if let Some(format) = format {
                cfg.output.format = format;
            }
            cfg.pool.allow_ineligible |= allow_ineligible;

            let roster = RosterLoader::new()
                .allow_ineligible(cfg.pool.allow_ineligible)
                .load_file(&roster)?;
            let report = analyze(&roster);
            info!(capacity = report.capacity, bottleneck = %report.bottleneck, "Capacity computed");
            print!("{}", output::render_capacity(&report, cfg.output.format)?);
            Ok(())
        }
    }
}

/// `form` arguments that override the loaded configuration
struct FormOverrides {
    seed: Option<u64>,
    capacity: Option<usize>,
    prefer_input_order: bool,
    names: Option<PathBuf>,
    policy: Option<AssignmentPolicy>,
    format: Option<OutputFormat>,
    allow_ineligible: bool,
}

impl FormOverrides {
    fn apply(self, cfg: &mut PoolConfig) {
        if self.seed.is_some() {
            cfg.pool.seed = self.seed;
        }
        if self.capacity.is_some() {
            cfg.pool.capacity = self.capacity;
        }
        if let Some(policy) = self.policy {
            cfg.pool.policy = policy;
        }
        if let Some(format) = self.format {
            cfg.output.format = format;
        }
        if let Some(names) = self.names {
            cfg.names.file = Some(names.to_string_lossy().into_owned());
        }
        cfg.pool.prefer_input_order |= self.prefer_input_order;
        cfg.pool.allow_ineligible |= self.allow_ineligible;
    }
}

fn log_startup() {
    let build = version::build_info();
    debug!(version = %build.full_version(), profile = %build.profile, "Starting partyforge");
}

/// Load the roster, run the orchestrator and print the result
fn form_teams(roster_path: &std::path::Path, cfg: &PoolConfig) -> Result<()> {
    let roster = RosterLoader::new()
        .allow_ineligible(cfg.pool.allow_ineligible)
        .load_file(roster_path)?;
    let names = cfg.names.name_pool()?;

    info!(
        policy = %cfg.pool.policy,
        seed = ?cfg.pool.seed,
        capacity = ?cfg.pool.capacity,
        prefer_input_order = cfg.pool.prefer_input_order,
        "Run settings"
    );

    let report = PoolOrchestrator::new(roster, names, cfg.pool.clone()).run()?;
    print!("{}", output::render_report(&report, cfg.output.format)?);
    Ok(())
}

fn handle_config_command(subcommand: ConfigSubcommand) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show { config } => {
            let cfg = PoolConfig::load(config.as_deref())?;
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigSubcommand::Init { path, force } => {
            let written = config::init_config(path.as_deref(), force)?;
            println!("Configuration file created: {}", written.display());
        }
        ConfigSubcommand::Validate { config } => {
            PoolConfig::load(config.as_deref())?;
            println!("Configuration is valid.");
        }
    }

    Ok(())
}
