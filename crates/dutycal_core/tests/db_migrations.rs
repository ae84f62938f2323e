use dutycal_core::db::migrations::latest_version;
use dutycal_core::db::{ensure_roster_schema, open_db, open_db_in_memory, DbError};
use dutycal_core::model::rubric::DEFAULT_RUBRICS;
use dutycal_core::repo::user_repo::SqliteUserRepository;
use dutycal_core::RepoError;
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "users");
    assert_table_exists(&conn, "rubrics");
    assert_table_exists(&conn, "duties");
    ensure_roster_schema(&conn).unwrap();
}

#[test]
fn fresh_database_is_seeded_with_default_rubrics_in_order() {
    let conn = open_db_in_memory().unwrap();
    let mut stmt = conn
        .prepare("SELECT name FROM rubrics ORDER BY rowid ASC;")
        .unwrap();
    let names: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(names, DEFAULT_RUBRICS.map(String::from).to_vec());
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dutycal.sqlite3");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute("DELETE FROM rubrics WHERE name = 'Maintenance';", [])
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM rubrics;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 4, "seed data must not be re-applied");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
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
fn repositories_refuse_unmigrated_connections() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteUserRepository::try_new(&conn)
        .err()
        .expect("raw connection has no roster tables");
    assert!(matches!(err, RepoError::Db(DbError::MissingTable("users"))));
}

#[test]
fn foreign_keys_are_enforced() {
    let conn = open_db_in_memory().unwrap();
    let err = conn
        .execute(
            "INSERT INTO duties (id, user_id, rubric, date) VALUES ('d', 'ghost', 'Support', '2024-04-15');",
            [],
        )
        .unwrap_err();
    assert!(err.to_string().contains("FOREIGN KEY"));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
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
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
