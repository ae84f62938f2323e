//! Duty repository contract and SQLite implementation.
//!
//! # Invariants
//! - A duty can only be written for an existing user.
//! - Dates are stored as canonical `YYYY-MM-DD` text and re-validated on read.
//! - The joined listing is the store-side `DutyWithUser` join, in insertion order.

use super::user_repo::{parse_user_row, UserColumns};
use super::{parse_uuid, RepoError, RepoResult};
use crate::db::ensure_roster_schema;
use crate::model::date::CalendarDate;
use crate::model::duty::{Duty, DutyId, DutyWithUser};
use rusqlite::{params, Connection, Row};

const JOINED_USER_COLUMNS: UserColumns = UserColumns {
    id: "user_id",
    name: "user_name",
    email: "user_email",
    phone: "user_phone",
    role: "user_role",
};

pub trait DutyRepository {
    fn create_duty(&self, duty: &Duty) -> RepoResult<DutyId>;
    fn update_duty(&self, duty: &Duty) -> RepoResult<()>;
    fn get_duty(&self, id: DutyId) -> RepoResult<Option<Duty>>;
    fn delete_duty(&self, id: DutyId) -> RepoResult<()>;
    fn list_duties_with_users(&self) -> RepoResult<Vec<DutyWithUser>>;
}

pub struct SqliteDutyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDutyRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_roster_schema(conn)?;
        Ok(Self { conn })
    }
}

impl DutyRepository for SqliteDutyRepository<'_> {
    fn create_duty(&self, duty: &Duty) -> RepoResult<DutyId> {
        duty.validate()?;

        let inserted = self.conn.execute(
            "INSERT INTO duties (id, user_id, rubric, date)
             SELECT ?1, ?2, ?3, ?4
             WHERE EXISTS(SELECT 1 FROM users WHERE id = ?2);",
            params![
                duty.id.to_string(),
                duty.user_id.to_string(),
                duty.rubric.as_str(),
                duty.date.to_string(),
            ],
        )?;
        if inserted == 0 {
            return Err(RepoError::UserNotFound(duty.user_id));
        }

        Ok(duty.id)
    }

    fn update_duty(&self, duty: &Duty) -> RepoResult<()> {
        duty.validate()?;
        if !self.user_exists(duty)? {
            return Err(RepoError::UserNotFound(duty.user_id));
        }

        let changed = self.conn.execute(
            "UPDATE duties
             SET user_id = ?2, rubric = ?3, date = ?4
             WHERE id = ?1;",
            params![
                duty.id.to_string(),
                duty.user_id.to_string(),
                duty.rubric.as_str(),
                duty.date.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::DutyNotFound(duty.id));
        }
        Ok(())
    }

    fn get_duty(&self, id: DutyId) -> RepoResult<Option<Duty>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, user_id, rubric, date FROM duties WHERE id = ?1;")?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_duty_row(row)?)),
            None => Ok(None),
        }
    }

    fn delete_duty(&self, id: DutyId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM duties WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::DutyNotFound(id));
        }
        Ok(())
    }

    fn list_duties_with_users(&self) -> RepoResult<Vec<DutyWithUser>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                d.id,
                d.user_id,
                d.rubric,
                d.date,
                u.name AS user_name,
                u.email AS user_email,
                u.phone AS user_phone,
                u.role AS user_role
             FROM duties d
             INNER JOIN users u ON u.id = d.user_id
             ORDER BY d.rowid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut duties = Vec::new();
        while let Some(row) = rows.next()? {
            duties.push(DutyWithUser {
                duty: parse_duty_row(row)?,
                user: parse_user_row(row, &JOINED_USER_COLUMNS)?,
            });
        }
        Ok(duties)
    }
}

impl SqliteDutyRepository<'_> {
    fn user_exists(&self, duty: &Duty) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1);",
            [duty.user_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

fn parse_duty_row(row: &Row<'_>) -> RepoResult<Duty> {
    let id_text: String = row.get("id")?;
    let user_text: String = row.get("user_id")?;
    let date_text: String = row.get("date")?;
    let date = CalendarDate::parse(&date_text).map_err(|err| {
        RepoError::InvalidData(format!("invalid date `{date_text}` in duties.date: {err}"))
    })?;

    let duty = Duty {
        id: parse_uuid(&id_text, "duties.id")?,
        user_id: parse_uuid(&user_text, "duties.user_id")?,
        rubric: row.get("rubric")?,
        date,
    };
    duty.validate()?;
    Ok(duty)
}
