//! Immutable roster snapshot handed to the calendar engine.
//!
//! # Invariants
//! - A snapshot is never mutated after construction; the store builds a new
//!   one after every write.
//! - `duties` keeps store insertion order.

use super::duty::{DutyId, DutyWithUser};
use super::user::{User, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSnapshot {
    pub users: Vec<User>,
    /// Rubric names in insertion order.
    pub rubrics: Vec<String>,
    pub duties: Vec<DutyWithUser>,
}

impl RosterSnapshot {
    pub fn new(users: Vec<User>, rubrics: Vec<String>, duties: Vec<DutyWithUser>) -> Self {
        Self {
            users,
            rubrics,
            duties,
        }
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    pub fn duty(&self, id: DutyId) -> Option<&DutyWithUser> {
        self.duties.iter().find(|duty| duty.id() == id)
    }

    pub fn has_rubric(&self, name: &str) -> bool {
        self.rubrics.iter().any(|rubric| rubric == name)
    }

    /// Returns `true` when any duty references `rubric`.
    pub fn rubric_in_use(&self, rubric: &str) -> bool {
        self.duties.iter().any(|duty| duty.rubric() == rubric)
    }
}
