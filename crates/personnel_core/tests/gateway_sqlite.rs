mod common;

use chrono::NaiveDate;
use common::{draft, manager};
use personnel_core::db::migrations::latest_version;
use personnel_core::db::open_db_in_memory;
use personnel_core::{
    EmployeeId, Gateway, LeagueId, PersistenceFailure, SqliteGateway, StoreSettings,
};
use rusqlite::Connection;

fn gateway() -> SqliteGateway {
    SqliteGateway::try_new(open_db_in_memory().unwrap()).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn inserts_return_generated_ids_and_load_all_reads_them_back() {
    let gateway = gateway();
    let south = gateway.insert_league("South").unwrap();
    let north = gateway.insert_league("North").unwrap();
    assert_ne!(north, south);

    let jane = draft("Doe", "Jane")
        .arrived_on(date(2021, 3, 1))
        .departed_on(date(2024, 6, 30));
    let jane_id = gateway.insert_employee(north, &jane, true).unwrap();
    let paul_id = gateway
        .insert_employee(north, &draft("Martin", "Paul"), false)
        .unwrap();

    let leagues = gateway.load_all().unwrap();
    let names: Vec<&str> = leagues.iter().map(|league| league.name.as_str()).collect();
    assert_eq!(names, vec!["North", "South"]);

    let north_record = &leagues[0];
    assert_eq!(north_record.id, north);
    assert_eq!(north_record.employees.len(), 2);
    assert_eq!(north_record.employees[0].id, jane_id);
    assert!(north_record.employees[0].is_administrator);
    assert_eq!(north_record.employees[0].fields, jane);
    assert_eq!(north_record.employees[1].id, paul_id);
    assert!(!north_record.employees[1].is_administrator);
    assert!(leagues[1].employees.is_empty());
}

#[test]
fn values_are_bound_not_spliced_into_sql() {
    let gateway = gateway();
    let hostile = "North'); DROP TABLE employee; --";
    let league = gateway.insert_league(hostile).unwrap();
    gateway
        .insert_employee(league, &draft("O'Brien", "Sean"), false)
        .unwrap();

    let leagues = gateway.load_all().unwrap();
    assert_eq!(leagues[0].name, hostile);
    assert_eq!(leagues[0].employees[0].fields.name, "O'Brien");
}

#[test]
fn duplicate_league_name_is_a_persistence_failure() {
    let gateway = gateway();
    gateway.insert_league("North").unwrap();

    let err = gateway.insert_league("North").unwrap_err();
    assert!(matches!(err, PersistenceFailure::Db(_)));
}

#[test]
fn update_of_missing_rows_reports_row_missing() {
    let gateway = gateway();
    let err = gateway.update_league(LeagueId(404), "Nowhere").unwrap_err();
    assert!(matches!(
        err,
        PersistenceFailure::RowMissing {
            table: "league",
            id: 404
        }
    ));
}

#[test]
fn update_of_deleted_or_unknown_employee_reports_row_missing() {
    let mut manager = manager();
    let north = manager.add_league("North").unwrap();
    let jane = manager
        .league_mut(north)
        .unwrap()
        .add_employee(draft("Doe", "Jane"))
        .unwrap();
    let paul = manager
        .league_mut(north)
        .unwrap()
        .add_employee(draft("Martin", "Paul"))
        .unwrap();

    let gateway = manager.gateway();
    gateway.delete_employee(jane).unwrap();
    let err = gateway
        .update_employee(manager.employee(jane).unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        PersistenceFailure::RowMissing { table: "employee", id } if id == jane.0
    ));

    // Paul's row still exists; the same call succeeds for it.
    gateway
        .update_employee(manager.employee(paul).unwrap())
        .unwrap();
}

#[test]
fn delete_is_idempotent_for_already_deleted_and_never_existing_rows() {
    let gateway = gateway();
    let league = gateway.insert_league("North").unwrap();
    let employee = gateway
        .insert_employee(league, &draft("Doe", "Jane"), false)
        .unwrap();

    gateway.delete_employee(employee).unwrap();
    gateway.delete_employee(employee).unwrap();
    gateway.delete_employee(EmployeeId(9_999)).unwrap();

    gateway.delete_league(league).unwrap();
    gateway.delete_league(league).unwrap();
    gateway.delete_league(LeagueId(9_999)).unwrap();

    assert!(gateway.load_all().unwrap().is_empty());
}

#[test]
fn rollback_discards_writes_of_the_unit_of_work() {
    let gateway = gateway();
    let league = gateway.insert_league("North").unwrap();

    gateway.begin().unwrap();
    gateway
        .insert_employee(league, &draft("Doe", "Jane"), false)
        .unwrap();
    gateway.rollback().unwrap();

    assert!(gateway.load_all().unwrap()[0].employees.is_empty());
    // Nothing open: rollback is a no-op.
    gateway.rollback().unwrap();
}

#[test]
fn load_all_rejects_two_administrators_in_one_league() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP INDEX idx_employee_league_administrator;")
        .unwrap();
    let gateway = SqliteGateway::try_new(conn).unwrap();
    let league = gateway.insert_league("North").unwrap();
    gateway
        .insert_employee(league, &draft("Doe", "Jane"), true)
        .unwrap();
    gateway
        .insert_employee(league, &draft("Roe", "Rick"), true)
        .unwrap();

    let err = gateway.load_all().unwrap_err();
    assert!(matches!(err, PersistenceFailure::InvalidData(_)));
}

#[test]
fn store_enforces_single_administrator_per_league() {
    let gateway = gateway();
    let league = gateway.insert_league("North").unwrap();
    gateway
        .insert_employee(league, &draft("Doe", "Jane"), true)
        .unwrap();

    let err = gateway
        .insert_employee(league, &draft("Roe", "Rick"), true)
        .unwrap_err();
    assert!(matches!(err, PersistenceFailure::Db(_)));
}

#[test]
fn close_is_idempotent_and_later_calls_fail() {
    let mut gateway = SqliteGateway::open(&StoreSettings::in_memory()).unwrap();
    gateway.close().unwrap();
    gateway.close().unwrap();

    assert!(gateway.is_closed());
    assert!(matches!(
        gateway.insert_league("North"),
        Err(PersistenceFailure::Closed)
    ));
    assert!(matches!(gateway.load_all(), Err(PersistenceFailure::Closed)));
}

#[test]
fn gateway_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteGateway::try_new(conn) {
        Err(PersistenceFailure::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn gateway_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE league (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
         CREATE TABLE employee (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            first_name TEXT NOT NULL,
            email TEXT NOT NULL,
            credential TEXT NOT NULL,
            league_id INTEGER NOT NULL
         );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteGateway::try_new(conn),
        Err(PersistenceFailure::MissingRequiredColumn {
            table: "employee",
            column: "arrival_date"
        })
    ));
}

#[test]
fn load_all_rejects_administrator_flag_outside_zero_and_one() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE league (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
         CREATE TABLE employee (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            first_name TEXT NOT NULL,
            email TEXT NOT NULL,
            credential TEXT NOT NULL,
            arrival_date TEXT,
            departure_date TEXT,
            is_administrator INTEGER NOT NULL DEFAULT 0,
            league_id INTEGER NOT NULL
         );
         INSERT INTO league (id, name) VALUES (1, 'North');
         INSERT INTO employee (id, name, first_name, email, credential, is_administrator, league_id)
         VALUES (7, 'Doe', 'Jane', 'jane@example.org', 'hash', 2, 1);",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let gateway = SqliteGateway::try_new(conn).unwrap();
    match gateway.load_all() {
        Err(PersistenceFailure::InvalidData(message)) => {
            assert!(message.contains("is_administrator"));
            assert!(message.contains('7'));
        }
        other => panic!("expected invalid data, got {other:?}"),
    }
}
