//! Personnel use-case services.
//!
//! # Responsibility
//! - Orchestrate gateway calls into league/employee operations.
//! - Keep callers decoupled from storage error types and SQL details.

pub mod league_entry;
pub mod personnel_manager;
