//! Roster: the players of one run and their eligible roles.

mod loader;
mod types;

pub use loader::RosterLoader;
pub use types::{ClassCounts, Player, Role, RoleSet, Roster};
