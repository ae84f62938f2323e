//! Repository contracts and SQLite implementations for the roster store.
//!
//! # Responsibility
//! - Provide CRUD over `users`, `rubrics` and `duties`.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths validate records before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - List reads return rows in insertion (`rowid`) order.

pub mod duty_repo;
pub mod rubric_repo;
pub mod user_repo;

use crate::db::DbError;
use crate::model::date::InvalidDateError;
use crate::model::duty::DutyId;
use crate::model::user::UserId;
use crate::model::ModelValidationError;
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by all roster tables.
#[derive(Debug)]
pub enum RepoError {
    Validation(ModelValidationError),
    Db(DbError),
    UserNotFound(UserId),
    DutyNotFound(DutyId),
    RubricNotFound(String),
    /// Unique constraint hit (duplicate e-mail or rubric name).
    Conflict(String),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::DutyNotFound(id) => write!(f, "duty not found: {id}"),
            Self::RubricNotFound(name) => write!(f, "rubric not found: `{name}`"),
            Self::Conflict(details) => write!(f, "conflict: {details}"),
            Self::InvalidData(message) => write!(f, "invalid persisted roster data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<InvalidDateError> for RepoError {
    fn from(value: InvalidDateError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

/// Maps a unique-constraint failure to `Conflict`, passing other errors through.
pub(crate) fn conflict_or(err: rusqlite::Error, details: impl FnOnce() -> String) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        if failure.code == ErrorCode::ConstraintViolation {
            return RepoError::Conflict(details());
        }
    }
    err.into()
}
