//! Rubric repository contract and SQLite implementation.
//!
//! # Invariants
//! - Rubric names are unique and stored trimmed.
//! - Renaming a rubric updates every duty that references the old name in
//!   the same transaction.
//! - Listing returns rubrics in insertion order; a rename keeps the position.

use super::{conflict_or, RepoError, RepoResult};
use crate::db::ensure_roster_schema;
use crate::model::rubric::normalize_rubric_name;
use log::info;
use rusqlite::{params, Connection};

pub trait RubricRepository {
    fn create_rubric(&self, name: &str) -> RepoResult<String>;
    /// Renames `old` to `new`; returns how many duties were re-pointed.
    fn rename_rubric(&self, old: &str, new: &str) -> RepoResult<usize>;
    fn list_rubrics(&self) -> RepoResult<Vec<String>>;
    fn delete_rubric(&self, name: &str) -> RepoResult<()>;
    fn rubric_in_use(&self, name: &str) -> RepoResult<bool>;
}

pub struct SqliteRubricRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRubricRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_roster_schema(conn)?;
        Ok(Self { conn })
    }
}

impl RubricRepository for SqliteRubricRepository<'_> {
    fn create_rubric(&self, name: &str) -> RepoResult<String> {
        let name = normalize_rubric_name(name)?;
        self.conn
            .execute("INSERT INTO rubrics (name) VALUES (?1);", [name.as_str()])
            .map_err(|err| conflict_or(err, || format!("rubric `{name}` already exists")))?;
        Ok(name)
    }

    fn rename_rubric(&self, old: &str, new: &str) -> RepoResult<usize> {
        let new = normalize_rubric_name(new)?;
        // Repositories never hold an open transaction on the shared connection.
        let tx = self.conn.unchecked_transaction()?;

        let changed = tx
            .execute(
                "UPDATE rubrics SET name = ?2 WHERE name = ?1;",
                params![old, new.as_str()],
            )
            .map_err(|err| conflict_or(err, || format!("rubric `{new}` already exists")))?;
        if changed == 0 {
            return Err(RepoError::RubricNotFound(old.to_string()));
        }

        let repointed = tx.execute(
            "UPDATE duties SET rubric = ?2 WHERE rubric = ?1;",
            params![old, new.as_str()],
        )?;
        tx.commit()?;

        info!(
            "event=rubric_rename module=repo status=ok duties_repointed={}",
            repointed
        );
        Ok(repointed)
    }

    fn list_rubrics(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM rubrics ORDER BY rowid ASC;")?;
        let mut rows = stmt.query([])?;
        let mut rubrics = Vec::new();
        while let Some(row) = rows.next()? {
            rubrics.push(row.get::<_, String>(0)?);
        }
        Ok(rubrics)
    }

    fn delete_rubric(&self, name: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM rubrics WHERE name = ?1;", [name])?;
        if changed == 0 {
            return Err(RepoError::RubricNotFound(name.to_string()));
        }
        Ok(())
    }

    fn rubric_in_use(&self, name: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM duties WHERE rubric = ?1);",
            [name],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}
