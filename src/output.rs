//! Rendering of run results for stdout.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::Result;
use crate::pool::RunReport;
use crate::roster::Role;
use crate::solver::CapacityReport;
use crate::teams::Team;

/// Output format for results
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human readable team blocks
    #[default]
    Text,
    /// A single JSON document
    Json,
}

/// Render a finished run in `format`.
pub fn render_report(report: &RunReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let mut out = render_teams(&report.teams);
            out.push_str(&leftover_line(&report.leftovers));
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Json => {
            let doc = json!({
                "capacity": report.capacity,
                "teams": report.teams,
                "leftovers": report.leftovers,
            });
            Ok(format!("{}\n", serde_json::to_string_pretty(&doc)?))
        }
    }
}

/// One block per team, each followed by a blank line.
pub fn render_teams(teams: &[Team]) -> String {
    let mut out = String::new();
    for team in teams {
        let _ = writeln!(out, "Team {}", team.name);
        let _ = writeln!(out, "==========");
        let _ = writeln!(out, "Tank: {}", team.members(Role::Tank).join(", "));
        let _ = writeln!(out, "DDs: {}", team.members(Role::Dd).join(", "));
        let _ = writeln!(out, "Healer: {}", team.members(Role::Heal).join(", "));
        out.push('\n');
    }
    out
}

/// `Leftovers: a, b` (nothing after the colon when empty)
pub fn leftover_line(leftovers: &[String]) -> String {
    format!("Leftovers: {}", leftovers.join(", "))
}

/// Render the `capacity` command's analysis.
pub fn render_capacity(report: &CapacityReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let mut out = String::new();
            let _ = writeln!(out, "Players:   {}", report.players);
            let _ = writeln!(out, "Capacity:  {}", report.capacity);
            for (role, eligible) in [
                (Role::Tank, report.eligible_tank),
                (Role::Dd, report.eligible_dd),
                (Role::Heal, report.eligible_heal),
            ] {
                let _ = writeln!(out, "{:<10} {}", format!("{}:", role.display_name()), eligible);
            }
            let _ = writeln!(out, "No role:   {}", report.ineligible);
            let _ = writeln!(out, "Bottleneck: {}", report.bottleneck);
            Ok(out)
        }
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(report)?)),
    }
}
