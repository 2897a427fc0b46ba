//! Domain model for the league/employee hierarchy.
//!
//! # Responsibility
//! - Define the entities held in memory by `PersonnelManager`.
//! - Keep ordering and administrator invariants next to the data.
//!
//! # Invariants
//! - Every stored entity carries a store-assigned id.
//! - A league's administrator is root or one of its own members.

pub mod employee;
pub mod league;
pub mod root;
