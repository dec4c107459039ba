//! Pool orchestrator
//!
//! Runs one team formation: capacity, role assignment, fairness shuffle,
//! team building and leftovers. All randomness for the run comes from a
//! single `ChaCha8Rng` owned here.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::PoolSettings;
use crate::error::Result;
use crate::roster::{Role, Roster};
use crate::solver::{assign_roles, capacity, ensure_feasible, AssignmentPolicy};
use crate::teams::{build_teams, NamePool, Team};

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Number of teams formed
    pub capacity: usize,
    /// Whether the capacity came from configuration rather than the solver
    pub overridden: bool,
    /// Policy that actually assigned roles
    pub policy: AssignmentPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// log10 of the number of maximal assignments sampled from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log10_assignments: Option<f64>,
    pub teams: Vec<Team>,
    /// People without a team, in roster order
    pub leftovers: Vec<String>,
}

/// Owns the roster, name pool and random source for one run.
pub struct PoolOrchestrator {
    settings: PoolSettings,
    roster: Roster,
    names: NamePool,
    rng: ChaCha8Rng,
}

impl PoolOrchestrator {
    pub fn new(roster: Roster, names: NamePool, settings: PoolSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            settings,
            roster,
            names,
            rng,
        }
    }

    /// Form teams. Consumes the orchestrator; a run is not repeatable on the
    /// same roster because players stay committed.
    pub fn run(mut self) -> Result<RunReport> {
        let players = self.roster.len();
        info!(players, "Forming teams");

        let (teams, overridden) = match self.settings.capacity {
            Some(requested) => (requested, true),
            None => (capacity(&self.roster), false),
        };
        // An override is validated here, before any player is touched
        let demand = ensure_feasible(&self.roster, teams)?;
        info!(capacity = teams, overridden, "Capacity determined");

        // With prefer_input_order the first 4k people are seated first
        let priority = demand.total();
        let prefer = self.settings.prefer_input_order;

        let everyone: Vec<usize> = (0..players).collect();
        let order = arrange(&everyone, priority, prefer, &mut self.rng);
        let outcome = assign_roles(
            &mut self.roster,
            &order,
            if prefer { priority } else { 0 },
            teams,
            self.settings.policy,
            &mut self.rng,
        )?;
        if let Some(log10) = outcome.log10_assignments {
            info!(
                log10_assignments = format!("{:.2}", log10),
                "Sampled among maximal assignments"
            );
        }

        // Fairness pass: team membership should not follow input position
        let committed: Vec<usize> = (0..players)
            .filter(|i| self.roster.get(*i).map_or(false, |p| p.is_committed()))
            .collect();
        let order = arrange(&committed, priority, prefer, &mut self.rng);
        debug!(
            tank = self.roster.committed_count(Role::Tank),
            dd = self.roster.committed_count(Role::Dd),
            heal = self.roster.committed_count(Role::Heal),
            "Committed players shuffled"
        );

        let formed = build_teams(&mut self.roster, &order, teams, self.names, &mut self.rng)?;

        let leftovers: Vec<String> = self
            .roster
            .leftovers()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        info!(teams = formed.len(), leftovers = leftovers.len(), "Teams formed");

        Ok(RunReport {
            capacity: teams,
            overridden,
            policy: outcome.policy,
            seed: self.settings.seed,
            log10_assignments: outcome.log10_assignments,
            teams: formed,
            leftovers,
        })
    }
}

/// Shuffled copy of `indices`.
///
/// With `prefer_input_order`, indices below `priority` are shuffled among
/// themselves and placed before the shuffled rest.
pub fn arrange<R: Rng + ?Sized>(
    indices: &[usize],
    priority: usize,
    prefer_input_order: bool,
    rng: &mut R,
) -> Vec<usize> {
    if !prefer_input_order {
        let mut order = indices.to_vec();
        order.shuffle(rng);
        return order;
    }

    let (mut head, mut tail): (Vec<usize>, Vec<usize>) =
        indices.iter().partition(|idx| **idx < priority);
    head.shuffle(rng);
    tail.shuffle(rng);
    head.extend(tail);
    head
}
