//! Persistence gateway contract.
//!
//! # Responsibility
//! - Translate domain operations into storage calls.
//! - Return store-generated identifiers on insert.
//! - Surface every storage failure as one error kind, `PersistenceFailure`.
//!
//! # Invariants
//! - Writes are visible to the next read; nothing is buffered.
//! - No retries happen here; a failure is reported exactly once.
//! - Deleting a league never cascades; callers delete members first.

use crate::db::DbError;
use crate::model::employee::{Employee, EmployeeId, NewEmployee};
use crate::model::league::LeagueId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod sqlite;

pub type GatewayResult<T> = Result<T, PersistenceFailure>;

/// Storage-layer failure, wrapping the underlying cause.
#[derive(Debug)]
pub enum PersistenceFailure {
    /// Connectivity, constraint or statement error from SQLite.
    Db(DbError),
    /// An update targeted a row that does not exist.
    RowMissing { table: &'static str, id: i64 },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted rows cannot be turned into a valid hierarchy.
    InvalidData(String),
    /// The gateway was closed.
    Closed,
}

impl Display for PersistenceFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::RowMissing { table, id } => write!(f, "no `{table}` row with id {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "personnel gateway requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "personnel gateway requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "personnel gateway requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid personnel data: {message}"),
            Self::Closed => write!(f, "personnel gateway is closed"),
        }
    }
}

impl Error for PersistenceFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for PersistenceFailure {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for PersistenceFailure {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One stored employee row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeRecord {
    pub id: EmployeeId,
    pub fields: NewEmployee,
    pub is_administrator: bool,
}

/// One stored league row with its employee rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueRecord {
    pub id: LeagueId,
    pub name: String,
    pub employees: Vec<EmployeeRecord>,
}

/// Storage contract used by `PersonnelManager`.
///
/// `begin`/`commit`/`rollback` bracket a unit of work so multi-step
/// operations land all-or-nothing.
pub trait Gateway {
    /// Reads every league and its employees from one consistent snapshot.
    fn load_all(&self) -> GatewayResult<Vec<LeagueRecord>>;
    /// Stores a league row and returns its generated id.
    fn insert_league(&self, name: &str) -> GatewayResult<LeagueId>;
    /// Stores an employee row under `league_id` and returns its generated id.
    fn insert_employee(
        &self,
        league_id: LeagueId,
        employee: &NewEmployee,
        is_administrator: bool,
    ) -> GatewayResult<EmployeeId>;
    /// Persists the league name.
    fn update_league(&self, id: LeagueId, name: &str) -> GatewayResult<()>;
    /// Persists every mutable employee field, keyed by id.
    fn update_employee(&self, employee: &Employee) -> GatewayResult<()>;
    /// Removes one league row. Missing rows are not an error.
    fn delete_league(&self, id: LeagueId) -> GatewayResult<()>;
    /// Removes one employee row. Missing rows are not an error.
    fn delete_employee(&self, id: EmployeeId) -> GatewayResult<()>;
    fn begin(&self) -> GatewayResult<()>;
    fn commit(&self) -> GatewayResult<()>;
    fn rollback(&self) -> GatewayResult<()>;
    /// Releases the underlying resource. Safe to call more than once.
    fn close(&mut self) -> GatewayResult<()>;
}
