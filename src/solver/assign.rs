//! Role assignment: commit players to roles so that exactly `k` teams can
//! be staffed.
//!
//! Two policies are available:
//!
//! - [`AssignmentPolicy::Uniform`] draws uniformly from every assignment that
//!   commits exactly `k` tanks, `2k` dds and `k` heals. Players are grouped
//!   into their eligibility class; players inside a class are exchangeable,
//!   so the sampler first picks how many players of each class take each
//!   role (weighted by the number of ways to complete the rest) and then
//!   picks the concrete players with a shuffle. With a priority group the
//!   classes are split at the group boundary and only assignments that
//!   commit as many priority players as possible are drawn from.
//! - [`AssignmentPolicy::FewestRolesFirst`] fills dd, tank and heal in turn,
//!   preferring players with the fewest eligible roles and breaking ties by
//!   the order it is handed. It never commits a player whose commitment would
//!   leave the remaining slots unstaffable. Fairness is approximate only.
//!
//! Limitation of the uniform sampler: completion counts are kept as `f64`
//! renormalised after every player, so counts below roughly `1e-300` of the
//! largest one round to zero and those assignments are never drawn.
//!
//! Cost: building the tables touches every entry once per player, so a run
//! is `O(players * (k+1)(2k+1)(k+1))`. At the [`UNIFORM_STATE_LIMIT`] of
//! 2^18 entries (about 49 teams) and 200 players that is roughly half a
//! second in a release build, with sixteen tables held at once. Past the
//! limit the assigner falls back to the greedy policy and logs a warning.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::capacity::{check_demand, demand_for, Demand};
use crate::error::{Error, Result};
use crate::roster::{ClassCounts, Role, RoleSet, Roster};

/// Largest completion table (entries) the uniform sampler will build.
pub const UNIFORM_STATE_LIMIT: usize = 1 << 18;

/// How the assigner picks among the many maximal assignments.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum AssignmentPolicy {
    /// Uniform among all assignments that staff the target
    #[default]
    Uniform,
    /// Greedy: least flexible players first, feasibility-checked
    FewestRolesFirst,
}

impl fmt::Display for AssignmentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentPolicy::Uniform => write!(f, "uniform"),
            AssignmentPolicy::FewestRolesFirst => write!(f, "fewest-roles-first"),
        }
    }
}

/// What the assigner did.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentOutcome {
    /// Policy that actually ran (after any fallback)
    pub policy: AssignmentPolicy,
    /// log10 of the number of assignments the uniform sampler chose from
    pub log10_assignments: Option<f64>,
}

/// Commit uncommitted players of `roster` so that exactly `teams` more teams
/// are staffed. Players already committed are left alone and not counted,
/// including by the feasibility check.
///
/// Roster indices below `priority` form the priority group; pass 0 for none.
/// The uniform policy commits as many of them as any maximal assignment can
/// and samples uniformly among the assignments that do. The greedy policy
/// breaks ties by `order`, which callers arrange with the priority group in
/// front.
pub fn assign_roles<R: Rng + ?Sized>(
    roster: &mut Roster,
    order: &[usize],
    priority: usize,
    teams: usize,
    policy: AssignmentPolicy,
    rng: &mut R,
) -> Result<AssignmentOutcome> {
    let demand = demand_for(&roster.uncommitted_class_counts(), teams)?;

    match policy {
        AssignmentPolicy::Uniform => {
            let states = table_len(demand);
            if states > UNIFORM_STATE_LIMIT {
                warn!(
                    teams,
                    states,
                    limit = UNIFORM_STATE_LIMIT,
                    "Roster too large for uniform sampling, falling back to fewest-roles-first"
                );
                assign_fewest_roles_first(roster, order, demand)?;
                return Ok(AssignmentOutcome {
                    policy: AssignmentPolicy::FewestRolesFirst,
                    log10_assignments: None,
                });
            }
            let log10 = assign_uniform(roster, demand, priority, rng)?;
            Ok(AssignmentOutcome {
                policy,
                log10_assignments: Some(log10),
            })
        }
        AssignmentPolicy::FewestRolesFirst => {
            assign_fewest_roles_first(roster, order, demand)?;
            Ok(AssignmentOutcome {
                policy,
                log10_assignments: None,
            })
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Uniform sampler
// ─────────────────────────────────────────────────────────────────

/// Eligibility classes in processing order. The empty class never plays.
const CLASS_ORDER: [u8; 7] = [0b001, 0b010, 0b100, 0b011, 0b101, 0b110, 0b111];

fn table_len(demand: Demand) -> usize {
    Role::ALL
        .iter()
        .map(|r| demand.get(*r) + 1)
        .fold(1, usize::saturating_mul)
}

/// Number of ways (scaled) to fill each remaining demand `(tank, dd, heal)`
/// using a suffix of the player groups.
#[derive(Debug, Clone)]
struct CompletionTable {
    dims: [usize; 3],
    values: Vec<f64>,
    /// Natural log of the factor every entry was divided by
    log_scale: f64,
}

impl CompletionTable {
    /// Table for the empty suffix: only "nothing left to fill" has a way.
    fn terminal(demand: Demand) -> Self {
        let dims = demand.slots().map(|open| open + 1);
        let mut values = vec![0.0; dims.iter().product()];
        values[0] = 1.0;
        Self {
            dims,
            values,
            log_scale: 0.0,
        }
    }

    /// Every remaining demand the table covers, in index order.
    fn states(dims: [usize; 3]) -> impl Iterator<Item = [usize; 3]> {
        let [da, db, dc] = dims;
        (0..da).flat_map(move |a| (0..db).flat_map(move |b| (0..dc).map(move |c| [a, b, c])))
    }

    fn strides(&self) -> [usize; 3] {
        [self.dims[1] * self.dims[2], self.dims[2], 1]
    }

    fn index(&self, at: [usize; 3]) -> usize {
        let s = self.strides();
        at[0] * s[0] + at[1] * s[1] + at[2]
    }

    fn get(&self, at: [usize; 3]) -> f64 {
        self.values[self.index(at)]
    }

    /// Zero every entry whose open slots do not add up to `open`.
    fn retain_open(&mut self, open: usize) {
        for (value, at) in self.values.iter_mut().zip(Self::states(self.dims)) {
            if at.iter().sum::<usize>() != open {
                *value = 0.0;
            }
        }
    }

    /// Prepend one player eligible for `roles`: they either sit out or take
    /// one of their roles.
    ///
    /// Entries are updated in place from the highest index down, so every
    /// `at - e_role` read still holds the previous table.
    fn absorb_player(&mut self, roles: RoleSet) {
        let strides = self.strides();
        let [da, db, dc] = self.dims;
        let mut max = 0.0f64;

        for a in (0..da).rev() {
            for b in (0..db).rev() {
                for c in (0..dc).rev() {
                    let at = [a, b, c];
                    let idx = a * strides[0] + b * strides[1] + c;
                    let mut v = self.values[idx];
                    for role in roles.iter() {
                        let i = role.index();
                        if at[i] > 0 {
                            v += self.values[idx - strides[i]];
                        }
                    }
                    self.values[idx] = v;
                    max = max.max(v);
                }
            }
        }

        if max > 0.0 {
            for v in &mut self.values {
                *v /= max;
            }
            self.log_scale += max.ln();
        }
    }
}

/// Exchangeable players: one eligibility class on one side of the priority
/// boundary.
#[derive(Debug, Clone)]
struct Group {
    class: RoleSet,
    members: Vec<usize>,
}

/// Uncommitted players split into groups, in `CLASS_ORDER`.
fn groups_of(roster: &Roster, include: impl Fn(usize) -> bool) -> Vec<Group> {
    CLASS_ORDER
        .iter()
        .map(|bits| Group {
            class: RoleSet::from_bits(*bits),
            members: roster
                .players()
                .iter()
                .enumerate()
                .filter(|(idx, p)| include(*idx) && !p.is_committed() && p.roles().bits() == *bits)
                .map(|(idx, _)| idx)
                .collect(),
        })
        .collect()
}

/// `tables[j]` counts completions using `groups[j..]`; the last entry is `start`.
fn suffix_tables(groups: &[Group], start: CompletionTable) -> Vec<CompletionTable> {
    let mut tables = vec![start];
    for group in groups.iter().rev() {
        let mut table = tables[tables.len() - 1].clone();
        for _ in &group.members {
            table.absorb_player(group.class);
        }
        tables.push(table);
    }
    tables.reverse();
    tables
}

/// Most priority players any maximal assignment commits.
///
/// Priority players can fill an open demand exactly when Hall's condition
/// holds for it (the rest sit out), so it is enough to scan the states the
/// other players can complete.
fn most_priority_committed(priority: &ClassCounts, rest: &CompletionTable, demand: Demand) -> Option<usize> {
    let full = demand.slots();
    CompletionTable::states(rest.dims)
        .filter(|at| rest.get(*at) > 0.0)
        .map(|at| Demand::from_slots([full[0] - at[0], full[1] - at[1], full[2] - at[2]]))
        .filter(|taken| check_demand(priority, *taken).is_ok())
        .map(|taken| taken.total())
        .max()
}

fn ln_factorials(n: usize) -> Vec<f64> {
    let mut table = Vec::with_capacity(n + 1);
    table.push(0.0);
    for i in 1..=n {
        table.push(table[i - 1] + (i as f64).ln());
    }
    table
}

/// Returns log10 of the number of maximal assignments sampled from.
fn assign_uniform<R: Rng + ?Sized>(
    roster: &mut Roster,
    demand: Demand,
    priority: usize,
    rng: &mut R,
) -> Result<f64> {
    let early = groups_of(roster, |idx| idx < priority);
    let late = groups_of(roster, |idx| idx >= priority);

    let late_tables = suffix_tables(&late, CompletionTable::terminal(demand));
    let mut early_counts = ClassCounts::default();
    for group in &early {
        for _ in &group.members {
            early_counts.add(group.class);
        }
    }
    let committed_early = most_priority_committed(&early_counts, &late_tables[0], demand)
        .ok_or_else(|| Error::Internal(format!("no assignment meets demand {:?}", demand.slots())))?;
    debug!(priority, committed_early, "Priority players committed");

    let mut boundary = late_tables[0].clone();
    boundary.retain_open(demand.total() - committed_early);
    let early_tables = suffix_tables(&early, boundary);

    let full = demand.slots();
    let total = early_tables[0].get(full);
    if total <= 0.0 {
        return Err(Error::Internal(format!(
            "no assignment meets demand {:?} after feasibility check passed",
            full
        )));
    }
    let log10_assignments = (total.ln() + early_tables[0].log_scale) / std::f64::consts::LN_10;

    let ln_fact = ln_factorials(roster.len());
    let mut remaining = full;
    for (groups, tables) in [(&early, &early_tables), (&late, &late_tables)] {
        for (j, group) in groups.iter().enumerate() {
            let take = sample_class_allocation(
                group.class,
                group.members.len(),
                remaining,
                &tables[j + 1],
                &ln_fact,
                rng,
            )?;

            let mut chosen = group.members.clone();
            chosen.shuffle(rng);
            let mut cursor = chosen.into_iter();
            for role in Role::ALL {
                for idx in cursor.by_ref().take(take[role.index()]) {
                    roster
                        .get_mut(idx)
                        .ok_or_else(|| Error::Internal(format!("roster index {} out of range", idx)))?
                        .commit(role)?;
                }
                remaining[role.index()] -= take[role.index()];
            }

            debug!(class = %group.class, players = group.members.len(), tank = take[0], dd = take[1], heal = take[2], "Class allocation");
        }
    }

    if remaining != [0, 0, 0] {
        return Err(Error::Internal(format!(
            "uniform sampler left demand {:?} unfilled",
            remaining
        )));
    }

    Ok(log10_assignments)
}

/// Draw how many of the `n` players in `class` take each role, with
/// probability proportional to `multinomial(n; t, d, h, rest) * completions`.
fn sample_class_allocation<R: Rng + ?Sized>(
    class: RoleSet,
    n: usize,
    remaining: [usize; 3],
    next: &CompletionTable,
    ln_fact: &[f64],
    rng: &mut R,
) -> Result<[usize; 3]> {
    let cap = |role: Role| {
        if class.contains(role) {
            remaining[role.index()].min(n)
        } else {
            0
        }
    };

    let mut candidates: Vec<([usize; 3], f64)> = Vec::new();
    for t in 0..=cap(Role::Tank) {
        for d in 0..=cap(Role::Dd).min(n - t) {
            for h in 0..=cap(Role::Heal).min(n - t - d) {
                let rest = [remaining[0] - t, remaining[1] - d, remaining[2] - h];
                let completions = next.get(rest);
                if completions <= 0.0 {
                    continue;
                }
                let ln_ways = ln_fact[n] - ln_fact[t] - ln_fact[d] - ln_fact[h] - ln_fact[n - t - d - h];
                candidates.push(([t, d, h], ln_ways + completions.ln()));
            }
        }
    }

    let peak = candidates
        .iter()
        .map(|(_, w)| *w)
        .fold(f64::NEG_INFINITY, f64::max);
    if candidates.is_empty() || !peak.is_finite() {
        return Err(Error::Internal(format!(
            "no allocation for class {} with remaining demand {:?}",
            class, remaining
        )));
    }

    let weights: Vec<f64> = candidates.iter().map(|(_, w)| (w - peak).exp()).collect();
    let total: f64 = weights.iter().sum();
    let mut pick = rng.gen::<f64>() * total;
    for ((take, _), weight) in candidates.iter().zip(&weights) {
        if pick < *weight {
            return Ok(*take);
        }
        pick -= weight;
    }
    // Rounding can leave `pick` a hair above the last weight
    Ok(candidates[candidates.len() - 1].0)
}

// ─────────────────────────────────────────────────────────────────
// Fewest-roles-first greedy
// ─────────────────────────────────────────────────────────────────

/// Roles are filled scarcest-slot first.
const GREEDY_ROLE_ORDER: [Role; 3] = [Role::Dd, Role::Tank, Role::Heal];

fn assign_fewest_roles_first(roster: &mut Roster, order: &[usize], mut demand: Demand) -> Result<()> {
    let mut counts = roster.uncommitted_class_counts();

    for role in GREEDY_ROLE_ORDER {
        let mut candidates: Vec<usize> = order
            .iter()
            .copied()
            .filter(|idx| {
                roster
                    .get(*idx)
                    .map(|p| !p.is_committed() && p.roles().contains(role))
                    .unwrap_or(false)
            })
            .collect();
        // Stable sort keeps `order` as the tie-break
        candidates.sort_by_key(|idx| roster.get(*idx).map(|p| p.roles().len()).unwrap_or(0));

        for idx in candidates {
            if demand.get(role) == 0 {
                break;
            }
            let class = match roster.get(idx) {
                Some(player) => player.roles(),
                None => continue,
            };

            let mut next_counts = counts;
            next_counts.remove(class);
            let mut next_demand = demand;
            next_demand.fill(role);

            if check_demand(&next_counts, next_demand).is_ok() {
                if let Some(player) = roster.get_mut(idx) {
                    player.commit(role)?;
                }
                counts = next_counts;
                demand = next_demand;
            }
        }

        if demand.get(role) > 0 {
            return Err(Error::Internal(format!(
                "greedy assignment left {} {} slot(s) open",
                demand.get(role),
                role
            )));
        }
    }

    Ok(())
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
