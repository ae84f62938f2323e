//! SQLite storage bootstrap for the roster store.
//!
//! # Responsibility
//! - Open and configure SQLite connections.
//! - Apply schema migrations in deterministic order.
//! - Verify that a handed-in connection carries the roster schema.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - No roster data is read or written before migrations succeed.

use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Columns every roster table must expose.
const ROSTER_SCHEMA: &[(&str, &[&str])] = &[
    ("users", &["id", "name", "email", "phone", "role"]),
    ("rubrics", &["name"]),
    ("duties", &["id", "user_id", "rubric", "date"]),
];

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    MissingTable(&'static str),
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::MissingTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Checks that `conn` exposes every roster table and column.
///
/// Repositories call this on construction so a raw, unmigrated connection
/// fails fast instead of on the first query.
pub fn ensure_roster_schema(conn: &Connection) -> DbResult<()> {
    for &(table, columns) in ROSTER_SCHEMA {
        let present = table_columns(conn, table)?;
        if present.is_empty() {
            return Err(DbError::MissingTable(table));
        }
        for &column in columns {
            if !present.iter().any(|name| name == column) {
                return Err(DbError::MissingColumn { table, column });
            }
        }
    }
    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get::<_, String>(1)?);
    }
    Ok(columns)
}
