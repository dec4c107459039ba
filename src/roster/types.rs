//! Core roster types: roles, role sets, players and the roster itself.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────
// Role
// ─────────────────────────────────────────────────────────────────

/// The three slots every team must fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Front-line role, one per team.
    Tank,
    /// Damage dealer, two per team.
    Dd,
    /// Healer, one per team.
    Heal,
}

impl Role {
    /// All roles in slot order.
    pub const ALL: [Role; 3] = [Role::Tank, Role::Dd, Role::Heal];

    /// Number of players of this role a single team needs.
    pub fn slots_per_team(&self) -> usize {
        match self {
            Role::Tank => 1,
            Role::Dd => 2,
            Role::Heal => 1,
        }
    }

    /// Position in [`Role::ALL`], used to index per-role arrays.
    pub fn index(&self) -> usize {
        match self {
            Role::Tank => 0,
            Role::Dd => 1,
            Role::Heal => 2,
        }
    }

    /// Slug used in config files and CLI args.
    pub fn slug(&self) -> &'static str {
        match self {
            Role::Tank => "tank",
            Role::Dd => "dd",
            Role::Heal => "heal",
        }
    }

    /// Label used when rendering a team.
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Tank => "Tank",
            Role::Dd => "DD",
            Role::Heal => "Healer",
        }
    }

    fn bit(&self) -> u8 {
        1 << self.index()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tank" => Ok(Role::Tank),
            "dd" | "dps" | "deedee" | "damage" => Ok(Role::Dd),
            "heal" | "healer" => Ok(Role::Heal),
            _ => Err(format!("Unknown role '{}'. Valid: tank, dd, heal", s)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Role Set
// ─────────────────────────────────────────────────────────────────

/// A subset of the three roles, stored as a bitmask.
///
/// There are eight possible sets; [`RoleSet::bits`] doubles as an index into
/// per-class tables (0 is the empty set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RoleSet(u8);

impl RoleSet {
    /// The empty set.
    pub const EMPTY: RoleSet = RoleSet(0);
    /// Every role.
    pub const ALL: RoleSet = RoleSet(0b111);

    /// Build a set from the three eligibility flags.
    pub fn from_flags(tank: bool, dd: bool, heal: bool) -> Self {
        let mut set = RoleSet::EMPTY;
        if tank {
            set.insert(Role::Tank);
        }
        if dd {
            set.insert(Role::Dd);
        }
        if heal {
            set.insert(Role::Heal);
        }
        set
    }

    /// Rebuild a set from its bitmask. Bits above the third are dropped.
    pub fn from_bits(bits: u8) -> Self {
        RoleSet(bits & Self::ALL.0)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn insert(&mut self, role: Role) {
        self.0 |= role.bit();
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    /// True if the two sets share at least one role.
    pub fn intersects(&self, other: RoleSet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Roles in the set, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        Role::ALL.into_iter().filter(move |r| self.contains(*r))
    }

    /// All seven non-empty subsets, singletons first, then pairs, then the full set.
    pub fn non_empty_subsets() -> [RoleSet; 7] {
        [
            RoleSet(0b001),
            RoleSet(0b010),
            RoleSet(0b100),
            RoleSet(0b011),
            RoleSet(0b101),
            RoleSet(0b110),
            RoleSet(0b111),
        ]
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        let mut set = RoleSet::EMPTY;
        for role in iter {
            set.insert(role);
        }
        set
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let slugs: Vec<&str> = self.iter().map(|r| r.slug()).collect();
        write!(f, "{}", slugs.join("+"))
    }
}

// ─────────────────────────────────────────────────────────────────
// Player
// ─────────────────────────────────────────────────────────────────

/// One person in the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    name: String,
    roles: RoleSet,
    assigned: Option<Role>,
    team: Option<String>,
}

impl Player {
    pub fn new(name: impl Into<String>, roles: RoleSet) -> Self {
        Self {
            name: name.into(),
            roles,
            assigned: None,
            team: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Roles this player is willing to take.
    pub fn roles(&self) -> RoleSet {
        self.roles
    }

    /// Role this player was committed to, if any.
    pub fn assigned_role(&self) -> Option<Role> {
        self.assigned
    }

    /// Name of the team this player joined, if any.
    pub fn team(&self) -> Option<&str> {
        self.team.as_deref()
    }

    pub fn is_committed(&self) -> bool {
        self.assigned.is_some()
    }

    /// Commit the player to a role. A player is committed at most once and
    /// only to a role they are eligible for.
    pub fn commit(&mut self, role: Role) -> Result<()> {
        if !self.roles.contains(role) {
            return Err(Error::Internal(format!(
                "{} is not eligible for {} (eligible: {})",
                self.name, role, self.roles
            )));
        }
        if let Some(existing) = self.assigned {
            return Err(Error::Internal(format!(
                "{} is already committed to {}",
                self.name, existing
            )));
        }
        self.assigned = Some(role);
        Ok(())
    }

    /// Record team membership. Only committed players join a team, once.
    pub fn join_team(&mut self, team: &str) -> Result<()> {
        if self.assigned.is_none() {
            return Err(Error::Internal(format!(
                "{} joined team {} without a committed role",
                self.name, team
            )));
        }
        if let Some(existing) = &self.team {
            return Err(Error::Internal(format!(
                "{} is already a member of team {}",
                self.name, existing
            )));
        }
        self.team = Some(team.to_string());
        Ok(())
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// ─────────────────────────────────────────────────────────────────
// Roster
// ─────────────────────────────────────────────────────────────────

/// Number of players in each of the eight eligibility classes, indexed by
/// [`RoleSet::bits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassCounts(pub [usize; 8]);

impl ClassCounts {
    pub fn get(&self, class: RoleSet) -> usize {
        self.0[class.bits() as usize]
    }

    pub fn add(&mut self, class: RoleSet) {
        self.0[class.bits() as usize] += 1;
    }

    pub fn remove(&mut self, class: RoleSet) {
        let slot = &mut self.0[class.bits() as usize];
        *slot = slot.saturating_sub(1);
    }

    /// Players eligible for at least one role in `roles`.
    pub fn eligible_for_any(&self, roles: RoleSet) -> usize {
        (1u8..8)
            .filter(|bits| RoleSet::from_bits(*bits).intersects(roles))
            .map(|bits| self.0[bits as usize])
            .sum()
    }

    /// Players eligible for `role` (possibly among others).
    pub fn eligible_for(&self, role: Role) -> usize {
        self.eligible_for_any(std::iter::once(role).collect())
    }
}

/// Ordered sequence of players for one run. Names are unique.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a player, rejecting duplicate names.
    pub fn push(&mut self, player: Player) -> Result<()> {
        if self.players.iter().any(|p| p.name == player.name) {
            return Err(Error::invalid_row(
                self.players.len() + 1,
                Some(&player.name),
                "duplicate name",
            ));
        }
        self.players.push(player);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn get(&self, index: usize) -> Option<&Player> {
        self.players.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Player> {
        self.players.get_mut(index)
    }

    /// Eligibility class sizes, counting only players not yet committed.
    pub fn uncommitted_class_counts(&self) -> ClassCounts {
        let mut counts = ClassCounts::default();
        for player in self.players.iter().filter(|p| !p.is_committed()) {
            counts.add(player.roles);
        }
        counts
    }

    /// Eligibility class sizes over the whole roster.
    pub fn class_counts(&self) -> ClassCounts {
        let mut counts = ClassCounts::default();
        for player in &self.players {
            counts.add(player.roles);
        }
        counts
    }

    /// Number of players committed to `role`.
    pub fn committed_count(&self, role: Role) -> usize {
        self.players
            .iter()
            .filter(|p| p.assigned == Some(role))
            .count()
    }

    /// Players that never joined a team, in input order.
    pub fn leftovers(&self) -> Vec<&Player> {
        self.players.iter().filter(|p| p.team.is_none()).collect()
    }
}

impl FromIterator<Player> for Roster {
    /// Collects players without the duplicate check; used by tests and
    /// callers that already validated names.
    fn from_iter<I: IntoIterator<Item = Player>>(iter: I) -> Self {
        Self {
            players: iter.into_iter().collect(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
