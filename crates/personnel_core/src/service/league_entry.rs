//! League-level operations issued through the owning manager.
//!
//! # Responsibility
//! - Expose add/rename/promote/remove on one league.
//! - Route every write through `PersonnelManager` delegation points.
//!
//! # Invariants
//! - A failed write leaves the league exactly as it was.
//! - Only root or a current member can become administrator.
//! - Removing the administrator hands the league back to root.

use crate::gateway::Gateway;
use crate::model::employee::{Employee, EmployeeChanges, EmployeeId, NewEmployee};
use crate::model::league::{
    normalize_league_name, Administrator, Identity, League, LeagueId, LeagueKey,
};
use crate::service::personnel_manager::{PersonnelError, PersonnelManager, PersonnelResult};
use log::{info, warn};

/// Mutable handle on one league, borrowed from its manager.
pub struct LeagueEntry<'m, G: Gateway> {
    manager: &'m mut PersonnelManager<G>,
    key: LeagueKey,
}

impl<'m, G: Gateway> LeagueEntry<'m, G> {
    pub(crate) fn new(manager: &'m mut PersonnelManager<G>, key: LeagueKey) -> Self {
        Self { manager, key }
    }

    pub fn id(&self) -> LeagueId {
        self.key.id
    }

    pub fn league(&self) -> PersonnelResult<&League> {
        self.manager.league_at(&self.key)
    }

    /// Creates, stores and adds one employee to this league.
    ///
    /// The employee enters the member set only once the store has returned
    /// its generated id.
    pub fn add_employee(&mut self, employee: NewEmployee) -> PersonnelResult<EmployeeId> {
        employee.validate()?;
        let league_id = self.key.id;
        self.manager.league_at(&self.key)?;

        let id = self.manager.insert_employee(league_id, &employee)?;
        self.manager
            .league_at_mut(&self.key)?
            .insert_member(Employee::from_parts(id, league_id, employee, false));

        info!(
            "event=employee_add module=personnel status=ok league_id={} employee_id={}",
            league_id, id
        );
        Ok(id)
    }

    /// Edits one member's fields and stores them.
    pub fn update_employee(
        &mut self,
        id: EmployeeId,
        changes: &EmployeeChanges,
    ) -> PersonnelResult<()> {
        if changes.is_empty() {
            self.manager
                .league_at(&self.key)?
                .employee(id)
                .ok_or(PersonnelError::EmployeeNotFound(id))?;
            return Ok(());
        }

        let current = self
            .manager
            .league_at(&self.key)?
            .employee(id)
            .ok_or(PersonnelError::EmployeeNotFound(id))?;
        let edited = current.with_changes(changes)?;
        if &edited == current {
            return Ok(());
        }

        self.manager.update_employee(&edited)?;
        self.manager.league_at_mut(&self.key)?.replace_member(edited);
        info!(
            "event=employee_update module=personnel status=ok league_id={} employee_id={}",
            self.key.id, id
        );
        Ok(())
    }

    /// Renames the league. The stored name changes first; memory follows.
    pub fn rename(&mut self, new_name: &str) -> PersonnelResult<()> {
        let name = normalize_league_name(new_name)?;
        if self.manager.league_at(&self.key)?.name() == name {
            return Ok(());
        }

        self.manager.update_league(self.key.id, &name)?;
        let key = self
            .manager
            .rekey_league(&self.key, name)
            .ok_or(PersonnelError::LeagueNotFound(self.key.id))?;
        self.key = key;
        info!(
            "event=league_rename module=personnel status=ok league_id={}",
            self.key.id
        );
        Ok(())
    }

    /// Makes `candidate` the administrator of this league.
    ///
    /// # Errors
    /// - `InsufficientRights` when `candidate` is an employee outside this
    ///   league. Storage is not touched in that case.
    pub fn set_administrator(&mut self, candidate: Identity) -> PersonnelResult<()> {
        let league = self.manager.league_at(&self.key)?;
        let target = league.check_administrator(candidate).map_err(|err| {
            warn!(
                "event=administrator_set module=personnel status=denied league_id={} employee_id={}",
                err.league_id, err.employee_id
            );
            err
        })?;

        let previous = match league.administrator() {
            Administrator::Root => None,
            Administrator::Employee(employee) => Some(employee),
        };
        if previous.map(Employee::id) == target {
            return Ok(());
        }

        // Demote before promoting: the store allows one administrator per league.
        let mut changed = Vec::with_capacity(2);
        if let Some(previous) = previous {
            let mut demoted = previous.clone();
            demoted.set_administrator_flag(false);
            changed.push(demoted);
        }
        if let Some(next) = target.and_then(|id| league.employee(id)) {
            let mut promoted = next.clone();
            promoted.set_administrator_flag(true);
            changed.push(promoted);
        }

        self.manager.update_employees(&changed)?;
        self.manager
            .league_at_mut(&self.key)?
            .apply_administrator(target);
        info!(
            "event=administrator_set module=personnel status=ok league_id={} root={}",
            self.key.id,
            target.is_none()
        );
        Ok(())
    }

    /// Deletes one member. If it administered the league, root takes over.
    pub fn remove_employee(&mut self, id: EmployeeId) -> PersonnelResult<()> {
        let was_administrator = self
            .manager
            .league_at(&self.key)?
            .employee(id)
            .map(Employee::is_administrator)
            .ok_or(PersonnelError::EmployeeNotFound(id))?;

        self.manager.delete_employee(id)?;
        self.manager.league_at_mut(&self.key)?.take_member(id);
        info!(
            "event=employee_remove module=personnel status=ok league_id={} employee_id={} administrator_reset={}",
            self.key.id, id, was_administrator
        );
        Ok(())
    }

    /// Deletes this league through the manager, members included.
    pub fn remove(self) -> PersonnelResult<()> {
        self.manager.remove_league(self.key.id)
    }
}
