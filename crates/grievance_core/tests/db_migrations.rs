use grievance_core::db::migrations::latest_version;
use grievance_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().expect("open in-memory db");

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "grievances");
    assert_table_exists(&conn, "users");
    assert_table_exists(&conn, "active_session");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("grievance.db");

    let conn_first = open_db(&path).expect("open db");
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).expect("open db");
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "grievances");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).expect("open connection");
    conn.execute_batch("PRAGMA user_version = 999;").expect("execute sql");
    drop(conn);

    let err = open_db(&path).expect_err("newer schema must be rejected");
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn schema_rejects_unknown_status_values() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let result = conn.execute(
        "INSERT INTO grievances (
            id, title, description, category, priority, state, location,
            status, anonymous, user_id, user_email, created_at, updated_at
        ) VALUES ('x', 't', 'd', 'Other', 'low', 's', 'l', 'archived', 0, 'u', 'e', 1, 1);",
        [],
    );
    assert!(result.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .expect("query row")
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .expect("query row");
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
