#![allow(dead_code)]

use personnel_core::{
    open_manager, Employee, EmployeeId, Gateway, GatewayResult, LeagueId, LeagueRecord,
    NewEmployee, PersistenceFailure, PersonnelManager, RootIdentity, SqliteGateway, StoreSettings,
};
use rusqlite::Connection;
use std::cell::RefCell;
use std::collections::HashSet;

pub fn manager() -> PersonnelManager<SqliteGateway> {
    open_manager(&StoreSettings::in_memory(), RootIdentity::default()).unwrap()
}

pub fn faulty_manager() -> PersonnelManager<FaultyGateway> {
    let inner = SqliteGateway::open(&StoreSettings::in_memory()).unwrap();
    PersonnelManager::load(FaultyGateway::new(inner), RootIdentity::default()).unwrap()
}

pub fn draft(name: &str, first_name: &str) -> NewEmployee {
    NewEmployee::new(
        name,
        first_name,
        format!("{}.{}@example.org", first_name, name).to_lowercase(),
        "argon2$opaque",
    )
}

pub fn employee_rows(conn: &Connection, league_id: LeagueId) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM employee WHERE league_id = ?1;",
        [league_id.0],
        |row| row.get(0),
    )
    .unwrap()
}

pub fn league_rows(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM league;", [], |row| row.get(0))
        .unwrap()
}

pub fn stored_administrator(conn: &Connection, league_id: LeagueId) -> Option<i64> {
    conn.query_row(
        "SELECT id FROM employee WHERE league_id = ?1 AND is_administrator = 1;",
        [league_id.0],
        |row| row.get(0),
    )
    .ok()
}

/// Gateway wrapper that fails the operations named in `fail`.
pub struct FaultyGateway {
    inner: SqliteGateway,
    failing: RefCell<HashSet<&'static str>>,
}

impl FaultyGateway {
    pub fn new(inner: SqliteGateway) -> Self {
        Self {
            inner,
            failing: RefCell::new(HashSet::new()),
        }
    }

    pub fn fail(&self, operation: &'static str) {
        self.failing.borrow_mut().insert(operation);
    }

    pub fn heal(&self) {
        self.failing.borrow_mut().clear();
    }

    pub fn connection(&self) -> &Connection {
        self.inner.connection().unwrap()
    }

    fn check(&self, operation: &'static str) -> GatewayResult<()> {
        if self.failing.borrow().contains(operation) {
            return Err(PersistenceFailure::from(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_IOERR),
                Some(format!("injected failure in {operation}")),
            )));
        }
        Ok(())
    }
}

impl Gateway for FaultyGateway {
    fn load_all(&self) -> GatewayResult<Vec<LeagueRecord>> {
        self.check("load_all")?;
        self.inner.load_all()
    }

    fn insert_league(&self, name: &str) -> GatewayResult<LeagueId> {
        self.check("insert_league")?;
        self.inner.insert_league(name)
    }

    fn insert_employee(
        &self,
        league_id: LeagueId,
        employee: &NewEmployee,
        is_administrator: bool,
    ) -> GatewayResult<EmployeeId> {
        self.check("insert_employee")?;
        self.inner
            .insert_employee(league_id, employee, is_administrator)
    }

    fn update_league(&self, id: LeagueId, name: &str) -> GatewayResult<()> {
        self.check("update_league")?;
        self.inner.update_league(id, name)
    }

    fn update_employee(&self, employee: &Employee) -> GatewayResult<()> {
        self.check("update_employee")?;
        // Promotions fail separately so a demotion can land first.
        if employee.is_administrator() {
            self.check("promote_employee")?;
        }
        self.inner.update_employee(employee)
    }

    fn delete_league(&self, id: LeagueId) -> GatewayResult<()> {
        self.check("delete_league")?;
        self.inner.delete_league(id)
    }

    fn delete_employee(&self, id: EmployeeId) -> GatewayResult<()> {
        self.check("delete_employee")?;
        self.inner.delete_employee(id)
    }

    fn begin(&self) -> GatewayResult<()> {
        self.check("begin")?;
        self.inner.begin()
    }

    fn commit(&self) -> GatewayResult<()> {
        self.check("commit")?;
        self.inner.commit()
    }

    fn rollback(&self) -> GatewayResult<()> {
        self.inner.rollback()
    }

    fn close(&mut self) -> GatewayResult<()> {
        self.inner.close()
    }
}
