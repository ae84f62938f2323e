//! Roster use-case service (the store behind the calendar).
//!
//! # Responsibility
//! - Own user, rubric and duty mutations on top of the repositories.
//! - Hand out immutable `RosterSnapshot`s for the calendar engine.
//!
//! # Invariants
//! - Every successful mutation returns a freshly loaded snapshot; callers
//!   never patch a snapshot in place.
//! - Rubric names stay unique, and a rubric referenced by any duty cannot be
//!   removed.
//! - Duties always point at an existing user.
//!
//! # See also
//! - `calendar_service` for the read side.

use crate::calendar::group::find_unknown_rubrics;
use crate::model::date::CalendarDate;
use crate::model::duty::{Duty, DutyId, DutyPatch};
use crate::model::rubric::normalize_rubric_name;
use crate::model::snapshot::RosterSnapshot;
use crate::model::user::{User, UserId, UserPatch, UserRole};
use crate::model::ModelValidationError;
use crate::repo::duty_repo::{DutyRepository, SqliteDutyRepository};
use crate::repo::rubric_repo::{RubricRepository, SqliteRubricRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::{RepoError, RepoResult};
use log::{info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum RosterServiceError {
    Validation(ModelValidationError),
    UserNotFound(UserId),
    DutyNotFound(DutyId),
    RubricNotFound(String),
    DuplicateRubric(String),
    /// The rubric is still referenced by this many duties.
    RubricInUse { rubric: String, duties: usize },
    DuplicateEmail(String),
    Repo(RepoError),
}

impl Display for RosterServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::DutyNotFound(id) => write!(f, "duty not found: {id}"),
            Self::RubricNotFound(name) => write!(f, "rubric not found: `{name}`"),
            Self::DuplicateRubric(name) => write!(f, "rubric `{name}` already exists"),
            Self::RubricInUse { rubric, duties } => write!(
                f,
                "rubric `{rubric}` is used by {duties} duty record(s) and cannot be removed"
            ),
            Self::DuplicateEmail(email) => write!(f, "email `{email}` is already in use"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RosterServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for RosterServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::UserNotFound(id) => Self::UserNotFound(id),
            RepoError::DutyNotFound(id) => Self::DutyNotFound(id),
            RepoError::RubricNotFound(name) => Self::RubricNotFound(name),
            other => Self::Repo(other),
        }
    }
}

impl From<ModelValidationError> for RosterServiceError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

pub type RosterResult<T> = Result<T, RosterServiceError>;

/// Result of a mutation: the affected value plus the reloaded roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterUpdate<T> {
    pub value: T,
    pub snapshot: RosterSnapshot,
}

/// New-user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: UserRole,
}

pub struct RosterService<U, R, D>
where
    U: UserRepository,
    R: RubricRepository,
    D: DutyRepository,
{
    users: U,
    rubrics: R,
    duties: D,
}

/// Roster service over one SQLite connection.
pub type SqliteRosterService<'conn> = RosterService<
    SqliteUserRepository<'conn>,
    SqliteRubricRepository<'conn>,
    SqliteDutyRepository<'conn>,
>;

impl<'conn> SqliteRosterService<'conn> {
    /// Builds all three repositories over `conn`.
    pub fn open(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self::new(
            SqliteUserRepository::try_new(conn)?,
            SqliteRubricRepository::try_new(conn)?,
            SqliteDutyRepository::try_new(conn)?,
        ))
    }
}

impl<U, R, D> RosterService<U, R, D>
where
    U: UserRepository,
    R: RubricRepository,
    D: DutyRepository,
{
    pub fn new(users: U, rubrics: R, duties: D) -> Self {
        Self {
            users,
            rubrics,
            duties,
        }
    }

    /// Loads the full roster.
    pub fn snapshot(&self) -> RosterResult<RosterSnapshot> {
        Ok(RosterSnapshot::new(
            self.users.list_users()?,
            self.rubrics.list_rubrics()?,
            self.duties.list_duties_with_users()?,
        ))
    }

    pub fn add_user(&self, input: &NewUser) -> RosterResult<RosterUpdate<UserId>> {
        let user = User::new(
            input.name.as_str(),
            input.email.as_str(),
            input.phone.as_str(),
            input.role,
        );
        user.validate()?;
        self.ensure_email_free(&user.email, None)?;

        let id = self.users.create_user(&user).map_err(map_email_conflict(&user.email))?;
        info!("event=user_add module=service status=ok user_id={}", id);
        self.updated(id)
    }

    /// Applies `patch`; absent fields keep their stored value.
    pub fn update_user(&self, id: UserId, patch: &UserPatch) -> RosterResult<RosterUpdate<()>> {
        let mut user = self
            .users
            .get_user(id)?
            .ok_or(RosterServiceError::UserNotFound(id))?;
        user.apply(patch);
        user.validate()?;
        self.ensure_email_free(&user.email, Some(id))?;

        self.users
            .update_user(&user)
            .map_err(map_email_conflict(&user.email))?;
        info!("event=user_update module=service status=ok user_id={}", id);
        self.updated(())
    }

    /// Removes a user together with all of their duties.
    pub fn remove_user(&self, id: UserId) -> RosterResult<RosterUpdate<()>> {
        self.users.delete_user(id)?;
        info!("event=user_remove module=service status=ok user_id={}", id);
        self.updated(())
    }

    pub fn add_rubric(&self, name: &str) -> RosterResult<RosterUpdate<String>> {
        let name = normalize_rubric_name(name)?;
        if self.rubrics.list_rubrics()?.contains(&name) {
            return Err(RosterServiceError::DuplicateRubric(name));
        }

        let name = self.rubrics.create_rubric(&name).map_err(|err| match err {
            RepoError::Conflict(_) => RosterServiceError::DuplicateRubric(name.clone()),
            other => other.into(),
        })?;
        info!("event=rubric_add module=service status=ok");
        self.updated(name)
    }

    /// Renames a rubric and re-points its duties; the value is the number of
    /// duties that moved.
    pub fn rename_rubric(&self, old: &str, new: &str) -> RosterResult<RosterUpdate<usize>> {
        let new = normalize_rubric_name(new)?;
        let rubrics = self.rubrics.list_rubrics()?;
        if !rubrics.iter().any(|rubric| rubric == old) {
            return Err(RosterServiceError::RubricNotFound(old.to_string()));
        }
        if old == new {
            return self.updated(0);
        }
        if rubrics.contains(&new) {
            return Err(RosterServiceError::DuplicateRubric(new));
        }

        let moved = self.rubrics.rename_rubric(old, &new).map_err(|err| match err {
            RepoError::Conflict(_) => RosterServiceError::DuplicateRubric(new.clone()),
            other => other.into(),
        })?;
        self.updated(moved)
    }

    /// Removes an unused rubric.
    pub fn remove_rubric(&self, name: &str) -> RosterResult<RosterUpdate<()>> {
        if self.rubrics.rubric_in_use(name)? {
            let duties = self
                .duties
                .list_duties_with_users()?
                .iter()
                .filter(|duty| duty.rubric() == name)
                .count();
            warn!(
                "event=rubric_remove module=service status=rejected reason=in_use duties={}",
                duties
            );
            return Err(RosterServiceError::RubricInUse {
                rubric: name.to_string(),
                duties,
            });
        }

        self.rubrics.delete_rubric(name)?;
        info!("event=rubric_remove module=service status=ok");
        self.updated(())
    }

    /// Assigns `user_id` to `rubric` on `date`.
    ///
    /// A rubric missing from the rubric list is accepted; the month view
    /// reports it as a warning.
    pub fn add_duty(
        &self,
        user_id: UserId,
        rubric: &str,
        date: CalendarDate,
    ) -> RosterResult<RosterUpdate<DutyId>> {
        let duty = Duty::new(user_id, rubric, date);
        duty.validate()?;
        let id = self.duties.create_duty(&duty)?;

        let update = self.updated(id)?;
        let unknown = update
            .snapshot
            .duty(id)
            .map(|created| find_unknown_rubrics([created], &update.snapshot.rubrics).len())
            .unwrap_or(0);
        if unknown > 0 {
            warn!(
                "event=duty_add module=service status=degraded duty_id={} reason=unknown_rubric",
                id
            );
        } else {
            info!("event=duty_add module=service status=ok duty_id={}", id);
        }
        Ok(update)
    }

    /// Applies `patch`; absent fields keep their stored value.
    pub fn update_duty(&self, id: DutyId, patch: &DutyPatch) -> RosterResult<RosterUpdate<()>> {
        let mut duty = self
            .duties
            .get_duty(id)?
            .ok_or(RosterServiceError::DutyNotFound(id))?;
        if !patch.is_empty() {
            duty.apply(patch);
            duty.validate()?;
            self.duties.update_duty(&duty)?;
            info!("event=duty_update module=service status=ok duty_id={}", id);
        }
        self.updated(())
    }

    pub fn remove_duty(&self, id: DutyId) -> RosterResult<RosterUpdate<()>> {
        self.duties.delete_duty(id)?;
        info!("event=duty_remove module=service status=ok duty_id={}", id);
        self.updated(())
    }

    fn ensure_email_free(&self, email: &str, owner: Option<UserId>) -> RosterResult<()> {
        match self.users.find_user_by_email(email)? {
            Some(existing) if Some(existing.id) != owner => {
                Err(RosterServiceError::DuplicateEmail(email.to_string()))
            }
            _ => Ok(()),
        }
    }

    fn updated<T>(&self, value: T) -> RosterResult<RosterUpdate<T>> {
        Ok(RosterUpdate {
            value,
            snapshot: self.snapshot()?,
        })
    }
}

fn map_email_conflict(email: &str) -> impl FnOnce(RepoError) -> RosterServiceError + '_ {
    move |err| match err {
        RepoError::Conflict(_) => RosterServiceError::DuplicateEmail(email.to_string()),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::{NewUser, RosterServiceError, SqliteRosterService};
    use crate::db::open_db_in_memory;
    use crate::model::date::CalendarDate;
    use crate::model::duty::DutyPatch;
    use crate::model::rubric::DEFAULT_RUBRICS;
    use crate::model::user::{UserPatch, UserRole};

    fn alice() -> NewUser {
        NewUser {
            name: "Alice Smith".to_string(),
            email: "alice@example.com".to_string(),
            phone: "555-0100".to_string(),
            role: UserRole::Admin,
        }
    }

    fn date(value: &str) -> CalendarDate {
        CalendarDate::parse(value).unwrap()
    }

    #[test]
    fn fresh_store_has_default_rubrics_and_no_duties() {
        let conn = open_db_in_memory().unwrap();
        let service = SqliteRosterService::open(&conn).unwrap();
        let snapshot = service.snapshot().unwrap();

        assert_eq!(snapshot.rubrics, DEFAULT_RUBRICS.map(String::from).to_vec());
        assert!(snapshot.users.is_empty());
        assert!(snapshot.duties.is_empty());
    }

    #[test]
    fn every_write_returns_a_fresh_snapshot() {
        let conn = open_db_in_memory().unwrap();
        let service = SqliteRosterService::open(&conn).unwrap();

        let user = service.add_user(&alice()).unwrap();
        assert_eq!(user.snapshot.users.len(), 1);

        let duty = service
            .add_duty(user.value, "Support", date("2024-04-15"))
            .unwrap();
        assert_eq!(duty.snapshot.duties.len(), 1);
        assert_eq!(duty.snapshot.duties[0].user.name, "Alice Smith");

        let removed = service.remove_duty(duty.value).unwrap();
        assert!(removed.snapshot.duties.is_empty());
    }

    #[test]
    fn duplicate_email_is_rejected_on_add_and_update() {
        let conn = open_db_in_memory().unwrap();
        let service = SqliteRosterService::open(&conn).unwrap();
        service.add_user(&alice()).unwrap();

        let err = service.add_user(&alice()).unwrap_err();
        assert!(matches!(err, RosterServiceError::DuplicateEmail(_)));

        let mut bob = alice();
        bob.name = "Bob".to_string();
        bob.email = "bob@example.com".to_string();
        let bob_id = service.add_user(&bob).unwrap().value;
        let patch = UserPatch {
            email: Some("alice@example.com".to_string()),
            ..UserPatch::default()
        };
        assert!(matches!(
            service.update_user(bob_id, &patch),
            Err(RosterServiceError::DuplicateEmail(_))
        ));
    }

    #[test]
    fn partial_user_update_keeps_other_fields() {
        let conn = open_db_in_memory().unwrap();
        let service = SqliteRosterService::open(&conn).unwrap();
        let id = service.add_user(&alice()).unwrap().value;

        let patch = UserPatch {
            phone: Some("555-0199".to_string()),
            ..UserPatch::default()
        };
        let snapshot = service.update_user(id, &patch).unwrap().snapshot;
        let user = snapshot.user(id).unwrap();
        assert_eq!(user.phone, "555-0199");
        assert_eq!(user.name, "Alice Smith");
        assert_eq!(user.role, UserRole::Admin);
    }

    #[test]
    fn rubric_rules_are_enforced() {
        let conn = open_db_in_memory().unwrap();
        let service = SqliteRosterService::open(&conn).unwrap();

        assert!(matches!(
            service.add_rubric("  Support "),
            Err(RosterServiceError::DuplicateRubric(_))
        ));
        assert!(matches!(
            service.add_rubric("   "),
            Err(RosterServiceError::Validation(_))
        ));
        assert!(matches!(
            service.rename_rubric("Support", "Operations"),
            Err(RosterServiceError::DuplicateRubric(_))
        ));
        assert!(matches!(
            service.rename_rubric("Nope", "Other"),
            Err(RosterServiceError::RubricNotFound(_))
        ));

        let user = service.add_user(&alice()).unwrap().value;
        service.add_duty(user, "Support", date("2024-04-15")).unwrap();
        match service.remove_rubric("Support") {
            Err(RosterServiceError::RubricInUse { duties, .. }) => assert_eq!(duties, 1),
            other => panic!("expected RubricInUse, got {other:?}"),
        }

        let snapshot = service.remove_rubric("Maintenance").unwrap().snapshot;
        assert!(!snapshot.has_rubric("Maintenance"));
    }

    #[test]
    fn rename_cascades_to_duties_and_keeps_position() {
        let conn = open_db_in_memory().unwrap();
        let service = SqliteRosterService::open(&conn).unwrap();
        let user = service.add_user(&alice()).unwrap().value;
        service.add_duty(user, "Support", date("2024-04-15")).unwrap();
        service.add_duty(user, "Support", date("2024-04-16")).unwrap();

        let update = service.rename_rubric("Support", "Help Desk").unwrap();
        assert_eq!(update.value, 2);
        assert_eq!(update.snapshot.rubrics[3], "Help Desk");
        assert!(update
            .snapshot
            .duties
            .iter()
            .all(|duty| duty.rubric() == "Help Desk"));
    }

    #[test]
    fn duty_requires_existing_user_and_accepts_unknown_rubric() {
        let conn = open_db_in_memory().unwrap();
        let service = SqliteRosterService::open(&conn).unwrap();

        let missing = uuid::Uuid::new_v4();
        assert!(matches!(
            service.add_duty(missing, "Support", date("2024-04-15")),
            Err(RosterServiceError::UserNotFound(id)) if id == missing
        ));

        let user = service.add_user(&alice()).unwrap().value;
        let update = service.add_duty(user, "Legacy", date("2024-04-15")).unwrap();
        assert_eq!(update.snapshot.duties[0].rubric(), "Legacy");
    }

    #[test]
    fn partial_duty_update_moves_only_the_date() {
        let conn = open_db_in_memory().unwrap();
        let service = SqliteRosterService::open(&conn).unwrap();
        let user = service.add_user(&alice()).unwrap().value;
        let id = service
            .add_duty(user, "Operations", date("2024-04-15"))
            .unwrap()
            .value;

        let patch = DutyPatch {
            date: Some(date("2024-04-20")),
            ..DutyPatch::default()
        };
        let snapshot = service.update_duty(id, &patch).unwrap().snapshot;
        let duty = snapshot.duty(id).unwrap();
        assert_eq!(duty.date(), date("2024-04-20"));
        assert_eq!(duty.rubric(), "Operations");
    }

    #[test]
    fn removing_a_user_removes_their_duties() {
        let conn = open_db_in_memory().unwrap();
        let service = SqliteRosterService::open(&conn).unwrap();
        let user = service.add_user(&alice()).unwrap().value;
        service.add_duty(user, "Support", date("2024-04-15")).unwrap();

        let snapshot = service.remove_user(user).unwrap().snapshot;
        assert!(snapshot.duties.is_empty());
        assert!(snapshot.users.is_empty());
    }
}
