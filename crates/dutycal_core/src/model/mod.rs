//! Roster domain model shared by the store and the calendar engine.
//!
//! # Responsibility
//! - Define canonical users, duties, rubrics and the calendar date key.
//! - Own field-level validation applied before persistence.
//!
//! # Invariants
//! - Every user and duty is identified by a stable UUID.
//! - Duty dates are naive calendar dates; no timezone is ever attached.
//! - The engine only sees already-joined `DutyWithUser` records.

pub mod date;
pub mod duty;
pub mod rubric;
pub mod snapshot;
pub mod user;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Field-level validation failure for roster records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// User display name is blank after trim.
    BlankUserName,
    /// E-mail is blank or lacks an `@`.
    InvalidEmail(String),
    /// Role text is not `admin` or `user`.
    UnknownRole(String),
    /// Rubric name is blank after trim.
    BlankRubric,
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankUserName => write!(f, "user name must not be blank"),
            Self::InvalidEmail(value) => write!(f, "invalid email `{value}`"),
            Self::UnknownRole(value) => {
                write!(f, "unknown role `{value}`; expected admin|user")
            }
            Self::BlankRubric => write!(f, "rubric name must not be blank"),
        }
    }
}

impl Error for ModelValidationError {}
