//! Teams: name pool and team formation.

mod builder;
mod names;

pub use builder::{build_teams, Team};
pub use names::NamePool;
