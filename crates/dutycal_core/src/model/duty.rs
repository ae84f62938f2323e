//! Duty domain model.
//!
//! # Invariants
//! - `id` is stable for the lifetime of the record.
//! - `date` is a validated naive calendar date.
//! - `rubric` is non-blank; it may name a rubric that no longer exists.

use super::date::CalendarDate;
use super::rubric::normalize_rubric_name;
use super::user::{User, UserId};
use super::ModelValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type DutyId = Uuid;

/// One assignment of one user to one rubric on one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Duty {
    pub id: DutyId,
    pub user_id: UserId,
    pub rubric: String,
    pub date: CalendarDate,
}

impl Duty {
    /// Creates a duty with a generated stable ID.
    pub fn new(user_id: UserId, rubric: impl Into<String>, date: CalendarDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            rubric: rubric.into().trim().to_string(),
            date,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        normalize_rubric_name(&self.rubric).map(|_| ())
    }

    /// Applies a partial update; `None` fields keep their current value.
    pub fn apply(&mut self, patch: &DutyPatch) {
        if let Some(user_id) = patch.user_id {
            self.user_id = user_id;
        }
        if let Some(rubric) = patch.rubric.as_deref() {
            self.rubric = rubric.trim().to_string();
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
    }
}

/// Partial duty update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DutyPatch {
    pub user_id: Option<UserId>,
    pub rubric: Option<String>,
    pub date: Option<CalendarDate>,
}

impl DutyPatch {
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.rubric.is_none() && self.date.is_none()
    }
}

/// Duty joined with its assigned user. The join is done by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutyWithUser {
    #[serde(flatten)]
    pub duty: Duty,
    pub user: User,
}

impl DutyWithUser {
    pub fn id(&self) -> DutyId {
        self.duty.id
    }

    pub fn date(&self) -> CalendarDate {
        self.duty.date
    }

    pub fn rubric(&self) -> &str {
        self.duty.rubric.as_str()
    }
}
