//! User repository contract and SQLite implementation.
//!
//! # Invariants
//! - E-mail addresses are unique; duplicates surface as `RepoError::Conflict`.
//! - Deleting a user cascades to their duties.

use super::{conflict_or, parse_uuid, RepoError, RepoResult};
use crate::db::ensure_roster_schema;
use crate::model::user::{User, UserId, UserRole};
use rusqlite::{params, Connection, Row};

const USER_SELECT_SQL: &str = "SELECT id, name, email, phone, role FROM users";

/// Column names used to read a `User` from a result row.
pub(crate) struct UserColumns {
    pub id: &'static str,
    pub name: &'static str,
    pub email: &'static str,
    pub phone: &'static str,
    pub role: &'static str,
}

pub(crate) const USER_COLUMNS: UserColumns = UserColumns {
    id: "id",
    name: "name",
    email: "email",
    phone: "phone",
    role: "role",
};

pub trait UserRepository {
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    fn update_user(&self, user: &User) -> RepoResult<()>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    fn list_users(&self) -> RepoResult<Vec<User>>;
    fn delete_user(&self, id: UserId) -> RepoResult<()>;
}

pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_roster_schema(conn)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        user.validate()?;

        self.conn
            .execute(
                "INSERT INTO users (id, name, email, phone, role)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    user.id.to_string(),
                    user.name.as_str(),
                    user.email.as_str(),
                    user.phone.as_str(),
                    user.role.as_str(),
                ],
            )
            .map_err(|err| conflict_or(err, || format!("email `{}` already in use", user.email)))?;

        Ok(user.id)
    }

    fn update_user(&self, user: &User) -> RepoResult<()> {
        user.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE users
                 SET name = ?2, email = ?3, phone = ?4, role = ?5
                 WHERE id = ?1;",
                params![
                    user.id.to_string(),
                    user.name.as_str(),
                    user.email.as_str(),
                    user.phone.as_str(),
                    user.role.as_str(),
                ],
            )
            .map_err(|err| conflict_or(err, || format!("email `{}` already in use", user.email)))?;

        if changed == 0 {
            return Err(RepoError::UserNotFound(user.id));
        }
        Ok(())
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_user_row(row, &USER_COLUMNS)?)),
            None => Ok(None),
        }
    }

    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE email = ?1;"))?;
        let mut rows = stmt.query([email.trim()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_user_row(row, &USER_COLUMNS)?)),
            None => Ok(None),
        }
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row, &USER_COLUMNS)?);
        }
        Ok(users)
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM users WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::UserNotFound(id));
        }
        Ok(())
    }
}

pub(crate) fn parse_user_row(row: &Row<'_>, columns: &UserColumns) -> RepoResult<User> {
    let id_text: String = row.get(columns.id)?;
    let role_text: String = row.get(columns.role)?;
    let role = UserRole::parse(&role_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid role `{role_text}` in users.role"))
    })?;

    let user = User {
        id: parse_uuid(&id_text, "users.id")?,
        name: row.get(columns.name)?,
        email: row.get(columns.email)?,
        phone: row.get(columns.phone)?,
        role,
    };
    user.validate()?;
    Ok(user)
}
