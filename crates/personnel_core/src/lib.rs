//! Core domain logic for the personnel registry.
//! This crate is the single source of truth for league/employee invariants.

pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod service;

pub use config::{RootIdentity, StoreSettings};
pub use gateway::sqlite::SqliteGateway;
pub use gateway::{EmployeeRecord, Gateway, GatewayResult, LeagueRecord, PersistenceFailure};
pub use logging::{
    default_log_level, init_logging, logging_status, LogLevel, LogSettings, LoggingError,
};
pub use model::employee::{
    Employee, EmployeeChanges, EmployeeId, EmployeeValidationError, NewEmployee,
};
pub use model::league::{
    Administrator, Identity, InsufficientRights, League, LeagueId, LeagueValidationError,
};
pub use model::root::Root;
pub use service::league_entry::LeagueEntry;
pub use service::personnel_manager::{PersonnelError, PersonnelManager, PersonnelResult};

/// Opens the store from `settings` and loads the full hierarchy.
pub fn open_manager(
    settings: &StoreSettings,
    root: RootIdentity,
) -> PersonnelResult<PersonnelManager<SqliteGateway>> {
    let gateway = SqliteGateway::open(settings)?;
    PersonnelManager::load(gateway, root)
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
