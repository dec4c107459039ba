//! Solver: capacity computation and role assignment.
//!
//! [`capacity`] answers how many complete teams a roster supports;
//! [`assign`] commits concrete players to roles to realise that number.

pub mod assign;
pub mod capacity;

pub use assign::{assign_roles, AssignmentPolicy};
pub use capacity::{analyze, capacity, ensure_feasible, CapacityReport};
