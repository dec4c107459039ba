//! Team builder: turns committed players into named teams.

use std::collections::VecDeque;

use rand::Rng;
use serde::Serialize;
use tracing::debug;

use super::names::NamePool;
use crate::error::{Error, Result};
use crate::roster::{Role, Roster};

/// One complete team. Members are stored by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    pub name: String,
    pub tank: String,
    pub dd: [String; 2],
    pub healer: String,
}

impl Team {
    /// Members holding `role`, in slot order.
    pub fn members(&self, role: Role) -> Vec<&str> {
        match role {
            Role::Tank => vec![self.tank.as_str()],
            Role::Dd => self.dd.iter().map(String::as_str).collect(),
            Role::Heal => vec![self.healer.as_str()],
        }
    }
}

/// Build `teams` teams from committed players.
///
/// `order` is the sequence of roster indices to fill teams from; callers pass
/// a shuffled order so dd pairs are not tied to input position. Names are
/// drawn from `names` before any player is touched, so a short pool fails
/// without side effects.
pub fn build_teams<R: Rng + ?Sized>(
    roster: &mut Roster,
    order: &[usize],
    teams: usize,
    names: NamePool,
    rng: &mut R,
) -> Result<Vec<Team>> {
    let mut team_names = names.draw(teams, rng)?.into_iter();

    let mut buckets: [VecDeque<usize>; 3] = Default::default();
    for idx in order {
        if let Some(player) = roster.get(*idx) {
            if let (Some(role), None) = (player.assigned_role(), player.team()) {
                buckets[role.index()].push_back(*idx);
            }
        }
    }

    let mut built = Vec::with_capacity(teams);
    for _ in 0..teams {
        let name = team_names
            .next()
            .ok_or_else(|| Error::Internal("team name iterator ran dry".to_string()))?;

        let tank = take_member(roster, &mut buckets, Role::Tank, &name)?;
        let dd_first = take_member(roster, &mut buckets, Role::Dd, &name)?;
        let dd_second = take_member(roster, &mut buckets, Role::Dd, &name)?;
        let healer = take_member(roster, &mut buckets, Role::Heal, &name)?;

        debug!(team = %name, %tank, %healer, "Team formed");
        built.push(Team {
            name,
            tank,
            dd: [dd_first, dd_second],
            healer,
        });
    }

    Ok(built)
}

/// Pop the next player of `role` and record their membership.
fn take_member(
    roster: &mut Roster,
    buckets: &mut [VecDeque<usize>; 3],
    role: Role,
    team: &str,
) -> Result<String> {
    let idx = buckets[role.index()].pop_front().ok_or_else(|| {
        Error::Internal(format!("no committed {} left for team {}", role, team))
    })?;
    let player = roster
        .get_mut(idx)
        .ok_or_else(|| Error::Internal(format!("roster index {} out of range", idx)))?;
    player.join_team(team)?;
    Ok(player.name().to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::roster::{Player, RoleSet};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn committed_roster(roles: &[Role]) -> Roster {
        let mut roster: Roster = roles
            .iter()
            .enumerate()
            .map(|(i, _)| Player::new(format!("p{}", i), RoleSet::ALL))
            .collect();
        for (i, role) in roles.iter().enumerate() {
            roster.get_mut(i).unwrap().commit(*role).unwrap();
        }
        roster
    }

    #[test]
    fn test_builds_full_teams() {
        use Role::*;
        let mut roster = committed_roster(&[Tank, Dd, Dd, Heal, Dd, Tank, Heal, Dd]);
        let order: Vec<usize> = (0..roster.len()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let teams = build_teams(&mut roster, &order, 2, NamePool::builtin(), &mut rng).unwrap();

        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].tank, "p0");
        assert_eq!(teams[0].dd, ["p1".to_string(), "p2".to_string()]);
        assert_eq!(teams[0].healer, "p3");
        assert_eq!(teams[1].tank, "p5");
        assert_ne!(teams[0].name, teams[1].name);

        for player in roster.players() {
            assert!(player.team().is_some());
        }
        let members: HashSet<&str> = teams
            .iter()
            .flat_map(|t| Role::ALL.iter().flat_map(move |r| t.members(*r)))
            .collect();
        assert_eq!(members.len(), 8);
    }

    #[test]
    fn test_order_controls_pairing() {
        use Role::*;
        let mut roster = committed_roster(&[Tank, Dd, Dd, Heal]);
        let order = vec![2, 3, 0, 1];
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let teams = build_teams(&mut roster, &order, 1, NamePool::builtin(), &mut rng).unwrap();
        assert_eq!(teams[0].dd, ["p2".to_string(), "p1".to_string()]);
    }

    #[test]
    fn test_insufficient_names_leaves_roster_untouched() {
        use Role::*;
        let mut roster = committed_roster(&[Tank, Dd, Dd, Heal]);
        let order: Vec<usize> = (0..roster.len()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let names = NamePool::from_names(Vec::<String>::new()).unwrap();

        let err = build_teams(&mut roster, &order, 1, names, &mut rng).unwrap_err();
        assert!(matches!(err, Error::InsufficientTeamNames { .. }));
        assert!(roster.players().iter().all(|p| p.team().is_none()));
    }

    #[test]
    fn test_empty_bucket_is_internal_error() {
        use Role::*;
        let mut roster = committed_roster(&[Tank, Dd, Heal]);
        let order: Vec<usize> = (0..roster.len()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let err = build_teams(&mut roster, &order, 1, NamePool::builtin(), &mut rng).unwrap_err();
        assert!(err.is_fatal());
    }
}
