//! Capacity: how many complete teams a roster can staff.
//!
//! Staffing `k` teams is a bipartite matching from players to `k` tank,
//! `2k` dd and `k` heal slots. Slots of one role share a neighbourhood, so
//! Hall's condition only has to hold for the seven non-empty role subsets:
//! for each subset `S`, the players eligible for some role in `S` must cover
//! the slots of `S`. That gives a closed form,
//! `k = min over S of floor(eligible(S) / slots(S))`, in O(n).

use serde::Serialize;

use crate::error::{Error, Result};
use crate::roster::{ClassCounts, Role, RoleSet, Roster};

/// Players needed per role, either for a whole run or what is still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Demand([usize; 3]);

impl Demand {
    /// Demand for staffing `teams` complete teams, or `None` when the slot
    /// count does not fit in a `usize`.
    ///
    /// Every per-role figure and every sum of them is bounded by the total
    /// checked here, so the other methods cannot overflow.
    pub fn for_teams(teams: usize) -> Option<Self> {
        teams.checked_mul(slots_for(RoleSet::ALL))?;
        let mut demand = [0; 3];
        for role in Role::ALL {
            demand[role.index()] = teams * role.slots_per_team();
        }
        Some(Demand(demand))
    }

    /// Open slots as `[tank, dd, heal]`.
    pub fn from_slots(slots: [usize; 3]) -> Self {
        Demand(slots)
    }

    pub fn slots(&self) -> [usize; 3] {
        self.0
    }

    pub fn get(&self, role: Role) -> usize {
        self.0[role.index()]
    }

    /// Combined demand of every role in `roles`.
    pub fn total_for(&self, roles: RoleSet) -> usize {
        roles.iter().map(|r| self.get(r)).sum()
    }

    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    /// Record one player committed to `role`. Saturates at zero.
    pub fn fill(&mut self, role: Role) {
        let slot = &mut self.0[role.index()];
        *slot = slot.saturating_sub(1);
    }
}

/// A violated Hall condition: the players eligible for `roles` cannot cover
/// the slots those roles need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortfall {
    pub roles: RoleSet,
    pub required: usize,
    pub available: usize,
}

/// Check whether `demand` can be met by the players counted in `counts`.
///
/// Singletons are checked before pairs and the full set, so the reported
/// shortfall names the narrowest deficient group of roles.
pub fn check_demand(counts: &ClassCounts, demand: Demand) -> std::result::Result<(), Shortfall> {
    for roles in RoleSet::non_empty_subsets() {
        let required = demand.total_for(roles);
        let available = counts.eligible_for_any(roles);
        if available < required {
            return Err(Shortfall {
                roles,
                required,
                available,
            });
        }
    }
    Ok(())
}

fn slots_for(roles: RoleSet) -> usize {
    roles.iter().map(|r| r.slots_per_team()).sum()
}

/// Maximum number of complete teams for the given class sizes.
pub fn max_teams(counts: &ClassCounts) -> usize {
    RoleSet::non_empty_subsets()
        .iter()
        .map(|roles| counts.eligible_for_any(*roles) / slots_for(*roles))
        .min()
        .unwrap_or(0)
}

/// Maximum number of complete teams the roster can staff.
pub fn capacity(roster: &Roster) -> usize {
    max_teams(&roster.class_counts())
}

/// Fail with [`Error::InfeasibleCapacity`] unless `teams` teams can be staffed.
pub fn ensure_feasible(roster: &Roster, teams: usize) -> Result<Demand> {
    demand_for(&roster.class_counts(), teams)
}

/// Demand for `teams` teams, checked against the players counted in `counts`.
///
/// A team count whose slots overflow `usize` is reported against the full
/// role set with `required` saturated to `usize::MAX`.
pub fn demand_for(counts: &ClassCounts, teams: usize) -> Result<Demand> {
    let demand = Demand::for_teams(teams).ok_or_else(|| Error::InfeasibleCapacity {
        requested: teams,
        roles: RoleSet::ALL.to_string(),
        required: usize::MAX,
        available: counts.eligible_for_any(RoleSet::ALL),
    })?;

    check_demand(counts, demand).map_err(|s| Error::InfeasibleCapacity {
        requested: teams,
        roles: s.roles.to_string(),
        required: s.required,
        available: s.available,
    })?;
    Ok(demand)
}

/// Summary printed by the `capacity` command.
#[derive(Debug, Clone, Serialize)]
pub struct CapacityReport {
    pub players: usize,
    pub capacity: usize,
    pub eligible_tank: usize,
    pub eligible_dd: usize,
    pub eligible_heal: usize,
    /// Players with no role at all
    pub ineligible: usize,
    /// Role group whose supply caps the capacity
    pub bottleneck: String,
}

/// Analyse a roster without assigning anything.
pub fn analyze(roster: &Roster) -> CapacityReport {
    let counts = roster.class_counts();
    let bottleneck = RoleSet::non_empty_subsets()
        .into_iter()
        .min_by_key(|roles| counts.eligible_for_any(*roles) / slots_for(*roles))
        .unwrap_or(RoleSet::ALL);

    CapacityReport {
        players: roster.len(),
        capacity: max_teams(&counts),
        eligible_tank: counts.eligible_for(Role::Tank),
        eligible_dd: counts.eligible_for(Role::Dd),
        eligible_heal: counts.eligible_for(Role::Heal),
        ineligible: counts.get(RoleSet::EMPTY),
        bottleneck: bottleneck.to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::roster::Player;
    use proptest::prelude::*;

    pub(crate) fn roster_of(sets: &[u8]) -> Roster {
        sets.iter()
            .enumerate()
            .map(|(i, bits)| Player::new(format!("p{}", i), RoleSet::from_bits(*bits)))
            .collect()
    }

    /// Exhaustive reference: every player takes one eligible role (players
    /// with none sit out) and the best `min(tank, heal, dd / 2)` wins.
    pub(crate) fn brute_force_capacity(sets: &[RoleSet]) -> usize {
        fn walk(sets: &[RoleSet], counts: [usize; 3]) -> usize {
            match sets.split_first() {
                None => counts[0].min(counts[2]).min(counts[1] / 2),
                Some((first, rest)) if first.is_empty() => walk(rest, counts),
                Some((first, rest)) => first
                    .iter()
                    .map(|role| {
                        let mut next = counts;
                        next[role.index()] += 1;
                        walk(rest, next)
                    })
                    .max()
                    .unwrap_or(0),
            }
        }
        walk(sets, [0; 3])
    }

    #[test]
    fn test_empty_roster() {
        assert_eq!(capacity(&Roster::new()), 0);
    }

    #[test]
    fn test_single_role_players_form_one_team() {
        // tank, dd, dd, heal
        let roster = roster_of(&[0b001, 0b010, 0b010, 0b100]);
        assert_eq!(capacity(&roster), 1);
    }

    #[test]
    fn test_no_dd_pair() {
        // tank+dd, heal
        let roster = roster_of(&[0b011, 0b100]);
        assert_eq!(capacity(&roster), 0);
    }

    #[test]
    fn test_flexible_players_are_shared_not_double_counted() {
        // Four all-rounders: each role alone could be covered, but one team
        // uses all four.
        let roster = roster_of(&[0b111; 4]);
        assert_eq!(capacity(&roster), 1);

        let roster = roster_of(&[0b111; 7]);
        assert_eq!(capacity(&roster), 1);

        let roster = roster_of(&[0b111; 8]);
        assert_eq!(capacity(&roster), 2);
    }

    #[test]
    fn test_pair_constraint_binds() {
        // Tank and heal both depend on the same two players.
        let roster = roster_of(&[0b101, 0b101, 0b010, 0b010, 0b010, 0b010]);
        assert_eq!(capacity(&roster), 1);
    }

    #[test]
    fn test_ineligible_players_ignored() {
        let roster = roster_of(&[0, 0b001, 0b010, 0b010, 0b100, 0]);
        assert_eq!(capacity(&roster), 1);
        assert_eq!(analyze(&roster).ineligible, 2);
    }

    #[test]
    fn test_ensure_feasible_names_role() {
        let roster = roster_of(&[0b001, 0b001, 0b010, 0b010, 0b100, 0b100]);
        assert!(ensure_feasible(&roster, 1).is_ok());

        let err = ensure_feasible(&roster, 2).unwrap_err();
        match err {
            Error::InfeasibleCapacity {
                roles,
                required,
                available,
                ..
            } => {
                assert_eq!(roles, "dd");
                assert_eq!(required, 4);
                assert_eq!(available, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_demand_fill() {
        let mut demand = Demand::for_teams(2).unwrap();
        assert_eq!(demand.get(Role::Dd), 4);
        assert_eq!(demand.total(), 8);
        demand.fill(Role::Tank);
        demand.fill(Role::Tank);
        demand.fill(Role::Tank);
        assert_eq!(demand.get(Role::Tank), 0);
        assert_eq!(demand.total(), 6);
    }

    #[test]
    fn test_overflowing_team_count_is_infeasible() {
        assert!(Demand::for_teams(usize::MAX).is_none());
        assert!(Demand::for_teams(usize::MAX / 4 + 1).is_none());
        assert_eq!(Demand::for_teams(usize::MAX / 4).unwrap().total(), usize::MAX / 4 * 4);

        let roster = roster_of(&[0b111; 8]);
        for teams in [usize::MAX, usize::MAX / 2, usize::MAX / 4] {
            let err = ensure_feasible(&roster, teams).unwrap_err();
            assert!(
                matches!(err, Error::InfeasibleCapacity { requested, available: 8, .. } if requested == teams),
                "unexpected error for {teams}: {err}"
            );
        }
    }

    #[test]
    fn test_analyze_reports_bottleneck() {
        let roster = roster_of(&[0b001, 0b001, 0b010, 0b100, 0b100]);
        let report = analyze(&roster);
        assert_eq!(report.capacity, 0);
        assert_eq!(report.bottleneck, "dd");
        assert_eq!(report.eligible_tank, 2);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_closed_form_matches_exhaustive(sets in prop::collection::vec(0u8..8, 0..10)) {
            let roster = roster_of(&sets);
            let role_sets: Vec<RoleSet> = sets.iter().map(|b| RoleSet::from_bits(*b)).collect();
            prop_assert_eq!(capacity(&roster), brute_force_capacity(&role_sets));
        }

        #[test]
        fn prop_capacity_is_feasible_and_next_is_not(sets in prop::collection::vec(0u8..8, 0..40)) {
            let roster = roster_of(&sets);
            let k = capacity(&roster);
            prop_assert!(ensure_feasible(&roster, k).is_ok());
            prop_assert!(ensure_feasible(&roster, k + 1).is_err());
        }
    }
}
