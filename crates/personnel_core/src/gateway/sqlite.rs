//! SQLite implementation of the persistence gateway.
//!
//! # Responsibility
//! - Own the single connection used by one `PersonnelManager`.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Every statement binds values as parameters; no SQL text is built
//!   from user-controlled data.
//! - Read paths reject invalid persisted state instead of masking it.
//! - After `close()` every call fails with `PersistenceFailure::Closed`.

use super::{EmployeeRecord, Gateway, GatewayResult, LeagueRecord, PersistenceFailure};
use crate::config::StoreSettings;
use crate::db::migrations::latest_version;
use crate::db::open_store;
use crate::model::employee::{Employee, EmployeeId, NewEmployee};
use crate::model::league::LeagueId;
use log::{debug, info, warn};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::time::Instant;

const EMPLOYEE_SELECT_SQL: &str = "SELECT
    id,
    name,
    first_name,
    email,
    credential,
    arrival_date,
    departure_date,
    is_administrator
FROM employee";

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("league", &["id", "name"]),
    (
        "employee",
        &[
            "id",
            "name",
            "first_name",
            "email",
            "credential",
            "arrival_date",
            "departure_date",
            "is_administrator",
            "league_id",
        ],
    ),
];

/// SQLite-backed gateway owning its connection.
pub struct SqliteGateway {
    conn: Option<Connection>,
}

impl SqliteGateway {
    /// Wraps a migrated connection.
    pub fn try_new(conn: Connection) -> GatewayResult<Self> {
        ensure_connection_ready(&conn)?;
        Ok(Self { conn: Some(conn) })
    }

    /// Opens the store described by `settings` and wraps it.
    pub fn open(settings: &StoreSettings) -> GatewayResult<Self> {
        let conn = open_store(settings)?;
        Self::try_new(conn)
    }

    /// Live connection, for read-only inspection by hosts and tests.
    pub fn connection(&self) -> GatewayResult<&Connection> {
        self.conn.as_ref().ok_or(PersistenceFailure::Closed)
    }

    pub fn is_closed(&self) -> bool {
        self.conn.is_none()
    }
}

impl Gateway for SqliteGateway {
    fn load_all(&self) -> GatewayResult<Vec<LeagueRecord>> {
        let conn = self.connection()?;
        let started_at = Instant::now();

        // Outside a unit of work, read under our own snapshot.
        let tx = if conn.is_autocommit() {
            Some(Transaction::new_unchecked(conn, TransactionBehavior::Deferred)?)
        } else {
            None
        };
        let leagues = read_hierarchy(conn)?;
        if let Some(tx) = tx {
            tx.commit()?;
        }

        info!(
            "event=gateway_load_all module=gateway status=ok leagues={} employees={} duration_ms={}",
            leagues.len(),
            leagues.iter().map(|league| league.employees.len()).sum::<usize>(),
            started_at.elapsed().as_millis()
        );
        Ok(leagues)
    }

    fn insert_league(&self, name: &str) -> GatewayResult<LeagueId> {
        let conn = self.connection()?;
        conn.execute("INSERT INTO league (name) VALUES (?1);", [name])?;
        let id = LeagueId(conn.last_insert_rowid());
        debug!("event=gateway_insert module=gateway table=league id={id}");
        Ok(id)
    }

    fn insert_employee(
        &self,
        league_id: LeagueId,
        employee: &NewEmployee,
        is_administrator: bool,
    ) -> GatewayResult<EmployeeId> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO employee (
                name,
                first_name,
                email,
                credential,
                arrival_date,
                departure_date,
                is_administrator,
                league_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                employee.name.as_str(),
                employee.first_name.as_str(),
                employee.email.as_str(),
                employee.credential.as_str(),
                employee.arrival_date,
                employee.departure_date,
                bool_to_int(is_administrator),
                league_id.0,
            ],
        )?;
        let id = EmployeeId(conn.last_insert_rowid());
        debug!("event=gateway_insert module=gateway table=employee id={id} league_id={league_id}");
        Ok(id)
    }

    fn update_league(&self, id: LeagueId, name: &str) -> GatewayResult<()> {
        let changed = self.connection()?.execute(
            "UPDATE league SET name = ?1 WHERE id = ?2;",
            params![name, id.0],
        )?;
        if changed == 0 {
            return Err(PersistenceFailure::RowMissing {
                table: "league",
                id: id.0,
            });
        }
        Ok(())
    }

    fn update_employee(&self, employee: &Employee) -> GatewayResult<()> {
        let changed = self.connection()?.execute(
            "UPDATE employee
             SET
                name = ?1,
                first_name = ?2,
                email = ?3,
                credential = ?4,
                arrival_date = ?5,
                departure_date = ?6,
                is_administrator = ?7
             WHERE id = ?8;",
            params![
                employee.name(),
                employee.first_name(),
                employee.email(),
                employee.credential(),
                employee.arrival_date(),
                employee.departure_date(),
                bool_to_int(employee.is_administrator()),
                employee.id().0,
            ],
        )?;
        if changed == 0 {
            return Err(PersistenceFailure::RowMissing {
                table: "employee",
                id: employee.id().0,
            });
        }
        Ok(())
    }

    fn delete_league(&self, id: LeagueId) -> GatewayResult<()> {
        let changed = self
            .connection()?
            .execute("DELETE FROM league WHERE id = ?1;", [id.0])?;
        log_delete("league", id.0, changed);
        Ok(())
    }

    fn delete_employee(&self, id: EmployeeId) -> GatewayResult<()> {
        let changed = self
            .connection()?
            .execute("DELETE FROM employee WHERE id = ?1;", [id.0])?;
        log_delete("employee", id.0, changed);
        Ok(())
    }

    fn begin(&self) -> GatewayResult<()> {
        self.connection()?.execute_batch("BEGIN IMMEDIATE;")?;
        Ok(())
    }

    fn commit(&self) -> GatewayResult<()> {
        self.connection()?.execute_batch("COMMIT;")?;
        Ok(())
    }

    fn rollback(&self) -> GatewayResult<()> {
        let conn = self.connection()?;
        if conn.is_autocommit() {
            return Ok(());
        }
        conn.execute_batch("ROLLBACK;")?;
        Ok(())
    }

    fn close(&mut self) -> GatewayResult<()> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };
        match conn.close() {
            Ok(()) => {
                info!("event=gateway_close module=gateway status=ok");
                Ok(())
            }
            Err((conn, err)) => {
                self.conn = Some(conn);
                Err(err.into())
            }
        }
    }
}

fn read_hierarchy(conn: &Connection) -> GatewayResult<Vec<LeagueRecord>> {
    let mut league_stmt = conn.prepare("SELECT id, name FROM league ORDER BY name ASC, id ASC;")?;
    let league_rows = league_stmt
        .query_map([], |row| Ok((LeagueId(row.get(0)?), row.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut employee_stmt = conn.prepare(&format!(
        "{EMPLOYEE_SELECT_SQL}
         WHERE league_id = ?1
         ORDER BY name ASC, first_name ASC, id ASC;"
    ))?;

    let mut leagues = Vec::with_capacity(league_rows.len());
    for (id, name) in league_rows {
        let mut rows = employee_stmt.query([id.0])?;
        let mut employees = Vec::new();
        while let Some(row) = rows.next()? {
            employees.push(parse_employee_row(row)?);
        }

        let mut administrators = employees.iter().filter(|record| record.is_administrator);
        if let (Some(first), Some(second)) = (administrators.next(), administrators.next()) {
            return Err(PersistenceFailure::InvalidData(format!(
                "league {id} has two administrators: {} and {}",
                first.id, second.id
            )));
        }

        leagues.push(LeagueRecord {
            id,
            name,
            employees,
        });
    }

    Ok(leagues)
}

fn parse_employee_row(row: &Row<'_>) -> GatewayResult<EmployeeRecord> {
    let id = EmployeeId(row.get("id")?);

    let is_administrator = match row.get::<_, i64>("is_administrator")? {
        0 => false,
        1 => true,
        other => {
            return Err(PersistenceFailure::InvalidData(format!(
                "invalid is_administrator value `{other}` in employee {id}"
            )));
        }
    };

    let fields = NewEmployee {
        name: row.get("name")?,
        first_name: row.get("first_name")?,
        email: row.get("email")?,
        credential: row.get("credential")?,
        arrival_date: row.get("arrival_date")?,
        departure_date: row.get("departure_date")?,
    };
    fields
        .validate()
        .map_err(|err| PersistenceFailure::InvalidData(format!("employee {id}: {err}")))?;

    Ok(EmployeeRecord {
        id,
        fields,
        is_administrator,
    })
}

fn log_delete(table: &str, id: i64, changed: usize) {
    if changed == 0 {
        warn!("event=gateway_delete module=gateway status=noop table={table} id={id} rows=0");
    } else {
        debug!("event=gateway_delete module=gateway status=ok table={table} id={id} rows={changed}");
    }
}

fn ensure_connection_ready(conn: &Connection) -> GatewayResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(PersistenceFailure::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(PersistenceFailure::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(PersistenceFailure::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> GatewayResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> GatewayResult<bool> {
    // Table names come from REQUIRED_COLUMNS only.
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
