//! Root aggregate over leagues and employees.
//!
//! # Responsibility
//! - Load the whole hierarchy once through the gateway.
//! - Mediate every gateway call on behalf of leagues and employees.
//! - Keep memory in step with what storage actually committed.
//!
//! # Invariants
//! - In-memory state changes only after the matching gateway call succeeds.
//! - Multi-step writes run inside one gateway unit of work.
//! - League removal deletes member rows before the league row.

use crate::config::RootIdentity;
use crate::gateway::{Gateway, GatewayResult, LeagueRecord, PersistenceFailure};
use crate::model::employee::{Employee, EmployeeId, EmployeeValidationError, NewEmployee};
use crate::model::league::{
    normalize_league_name, Identity, InsufficientRights, League, LeagueId, LeagueKey,
    LeagueValidationError,
};
use crate::model::root::Root;
use crate::service::league_entry::LeagueEntry;
use log::{error, info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type PersonnelResult<T> = Result<T, PersonnelError>;

/// Errors from personnel operations.
#[derive(Debug)]
pub enum PersonnelError {
    /// Storage failed; memory was left as it was before the call.
    Persistence(PersistenceFailure),
    /// Administrator candidate is neither root nor a league member.
    InsufficientRights(InsufficientRights),
    LeagueNotFound(LeagueId),
    EmployeeNotFound(EmployeeId),
    InvalidEmployee(EmployeeValidationError),
    InvalidLeague(LeagueValidationError),
}

impl Display for PersonnelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persistence(err) => write!(f, "persistence failure: {err}"),
            Self::InsufficientRights(err) => write!(f, "insufficient rights: {err}"),
            Self::LeagueNotFound(id) => write!(f, "league not found: {id}"),
            Self::EmployeeNotFound(id) => write!(f, "employee not found: {id}"),
            Self::InvalidEmployee(err) => write!(f, "{err}"),
            Self::InvalidLeague(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PersonnelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            Self::InsufficientRights(err) => Some(err),
            Self::InvalidEmployee(err) => Some(err),
            Self::InvalidLeague(err) => Some(err),
            Self::LeagueNotFound(_) | Self::EmployeeNotFound(_) => None,
        }
    }
}

impl From<PersistenceFailure> for PersonnelError {
    fn from(value: PersistenceFailure) -> Self {
        Self::Persistence(value)
    }
}

impl From<InsufficientRights> for PersonnelError {
    fn from(value: InsufficientRights) -> Self {
        Self::InsufficientRights(value)
    }
}

impl From<EmployeeValidationError> for PersonnelError {
    fn from(value: EmployeeValidationError) -> Self {
        Self::InvalidEmployee(value)
    }
}

impl From<LeagueValidationError> for PersonnelError {
    fn from(value: LeagueValidationError) -> Self {
        Self::InvalidLeague(value)
    }
}

/// In-memory personnel hierarchy bound to one gateway session.
pub struct PersonnelManager<G: Gateway> {
    gateway: G,
    root: Root,
    leagues: BTreeMap<LeagueKey, League>,
}

impl<G: Gateway> PersonnelManager<G> {
    /// Loads every league and employee through `gateway`.
    ///
    /// A read failure aborts construction; no partially loaded manager is
    /// ever returned.
    pub fn load(gateway: G, root_identity: RootIdentity) -> PersonnelResult<Self> {
        let started_at = Instant::now();
        let records = persisted("load_all", gateway.load_all())?;

        let mut leagues = BTreeMap::new();
        for record in records {
            let league = assemble_league(record)?;
            leagues.insert(LeagueKey::of(&league), league);
        }

        info!(
            "event=personnel_load module=personnel status=ok leagues={} duration_ms={}",
            leagues.len(),
            started_at.elapsed().as_millis()
        );
        Ok(Self {
            gateway,
            root: Root::new(root_identity),
            leagues,
        })
    }

    /// Process-wide root administrator.
    pub fn root(&self) -> &Root {
        &self.root
    }

    /// Leagues ordered by name.
    pub fn leagues(&self) -> impl Iterator<Item = &League> + '_ {
        self.leagues.values()
    }

    pub fn league_count(&self) -> usize {
        self.leagues.len()
    }

    pub fn league(&self, id: LeagueId) -> Option<&League> {
        self.leagues.values().find(|league| league.id() == id)
    }

    pub fn league_by_name(&self, name: &str) -> Option<&League> {
        self.leagues.values().find(|league| league.name() == name)
    }

    pub fn employee(&self, id: EmployeeId) -> Option<&Employee> {
        self.leagues.values().find_map(|league| league.employee(id))
    }

    /// Mutable handle for league-level operations.
    pub fn league_mut(&mut self, id: LeagueId) -> PersonnelResult<LeagueEntry<'_, G>> {
        let key = self.league_key(id)?;
        Ok(LeagueEntry::new(self, key))
    }

    /// Whether `identity` may manage league `id`.
    ///
    /// Root manages every league; an employee only the league it administers.
    pub fn can_manage(&self, identity: Identity, id: LeagueId) -> bool {
        self.league(id)
            .is_some_and(|league| league.is_administered_by(identity))
    }

    /// Creates and stores a league administered by root.
    pub fn add_league(&mut self, name: &str) -> PersonnelResult<LeagueId> {
        let name = normalize_league_name(name)?;
        let id = self.insert_league(&name)?;
        let league = League::new(id, name);
        self.leagues.insert(LeagueKey::of(&league), league);
        info!("event=league_add module=personnel status=ok league_id={id}");
        Ok(id)
    }

    /// Deletes a league and every one of its employees.
    pub fn remove_league(&mut self, id: LeagueId) -> PersonnelResult<()> {
        let key = self.league_key(id)?;
        let member_ids: Vec<EmployeeId> = self
            .league_at(&key)?
            .employees()
            .map(Employee::id)
            .collect();

        in_unit_of_work(&self.gateway, "remove_league", |gateway| {
            for employee_id in &member_ids {
                persisted("delete_employee", gateway.delete_employee(*employee_id))?;
            }
            persisted("delete_league", gateway.delete_league(id))
        })?;

        self.leagues.remove(&key);
        info!(
            "event=league_remove module=personnel status=ok league_id={} employees={}",
            id,
            member_ids.len()
        );
        Ok(())
    }

    /// Deletes one employee wherever it belongs.
    pub fn remove_employee(&mut self, id: EmployeeId) -> PersonnelResult<()> {
        let league_id = self
            .employee(id)
            .map(Employee::league_id)
            .ok_or(PersonnelError::EmployeeNotFound(id))?;
        self.league_mut(league_id)?.remove_employee(id)
    }

    /// Releases the gateway. Later gateway-backed calls fail.
    pub fn close(&mut self) -> PersonnelResult<()> {
        persisted("close", self.gateway.close())
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    fn league_key(&self, id: LeagueId) -> PersonnelResult<LeagueKey> {
        self.league(id)
            .map(LeagueKey::of)
            .ok_or(PersonnelError::LeagueNotFound(id))
    }

    pub(crate) fn league_at(&self, key: &LeagueKey) -> PersonnelResult<&League> {
        self.leagues
            .get(key)
            .ok_or(PersonnelError::LeagueNotFound(key.id))
    }

    pub(crate) fn league_at_mut(&mut self, key: &LeagueKey) -> PersonnelResult<&mut League> {
        self.leagues
            .get_mut(key)
            .ok_or(PersonnelError::LeagueNotFound(key.id))
    }

    /// Moves a renamed league to its new position in the ordered set.
    pub(crate) fn rekey_league(&mut self, key: &LeagueKey, name: String) -> Option<LeagueKey> {
        let mut league = self.leagues.remove(key)?;
        league.set_name(name);
        let new_key = LeagueKey::of(&league);
        self.leagues.insert(new_key.clone(), league);
        Some(new_key)
    }

    // Delegation points: every gateway call goes through one of these.

    pub(crate) fn insert_league(&self, name: &str) -> PersonnelResult<LeagueId> {
        persisted("insert_league", self.gateway.insert_league(name))
    }

    pub(crate) fn insert_employee(
        &self,
        league_id: LeagueId,
        employee: &NewEmployee,
    ) -> PersonnelResult<EmployeeId> {
        persisted(
            "insert_employee",
            self.gateway.insert_employee(league_id, employee, false),
        )
    }

    pub(crate) fn update_league(&self, id: LeagueId, name: &str) -> PersonnelResult<()> {
        persisted("update_league", self.gateway.update_league(id, name))
    }

    pub(crate) fn update_employee(&self, employee: &Employee) -> PersonnelResult<()> {
        persisted("update_employee", self.gateway.update_employee(employee))
    }

    /// Persists several employee rows in one unit of work.
    pub(crate) fn update_employees(&self, employees: &[Employee]) -> PersonnelResult<()> {
        in_unit_of_work(&self.gateway, "update_employees", |gateway| {
            for employee in employees {
                persisted("update_employee", gateway.update_employee(employee))?;
            }
            Ok(())
        })
    }

    pub(crate) fn delete_employee(&self, id: EmployeeId) -> PersonnelResult<()> {
        persisted("delete_employee", self.gateway.delete_employee(id))
    }
}

fn assemble_league(record: LeagueRecord) -> PersonnelResult<League> {
    let league_id = record.id;
    let members = record.employees.into_iter().map(|employee| {
        Employee::from_parts(
            employee.id,
            league_id,
            employee.fields,
            employee.is_administrator,
        )
    });
    League::assemble(league_id, record.name, members).map_err(|err| {
        error!(
            "event=personnel_load module=personnel status=error league_id={} error={}",
            league_id, err
        );
        PersonnelError::Persistence(PersistenceFailure::InvalidData(err.to_string()))
    })
}

/// Maps a gateway result into the manager's error type, logging failures.
fn persisted<T>(operation: &'static str, result: GatewayResult<T>) -> PersonnelResult<T> {
    result.map_err(|err| {
        error!(
            "event=gateway_call module=personnel status=error operation={} error={}",
            operation, err
        );
        PersonnelError::Persistence(err)
    })
}

/// Runs `work` between `begin` and `commit`, rolling back on any error.
fn in_unit_of_work<G, T>(
    gateway: &G,
    operation: &'static str,
    work: impl FnOnce(&G) -> PersonnelResult<T>,
) -> PersonnelResult<T>
where
    G: Gateway,
{
    persisted(operation, gateway.begin())?;

    let outcome = work(gateway).and_then(|value| {
        persisted(operation, gateway.commit())?;
        Ok(value)
    });

    if outcome.is_err() {
        if let Err(err) = gateway.rollback() {
            warn!(
                "event=unit_of_work module=personnel status=rollback_failed operation={} error={}",
                operation, err
            );
        }
    }
    outcome
}
