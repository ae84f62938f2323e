//! User domain model.
//!
//! # Invariants
//! - `id` is stable and never reused.
//! - `name` is non-blank and `email` contains `@` once validated.

use super::ModelValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;

/// Access role; only admins manage the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    User,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ModelValidationError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(ModelValidationError::UnknownRole(value.to_string())),
        }
    }
}

/// Person who can be assigned duties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: UserRole,
}

impl User {
    /// Creates a user with a generated stable ID.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        role: UserRole,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into().trim().to_string(),
            email: email.into().trim().to_string(),
            phone: phone.into().trim().to_string(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.name.trim().is_empty() {
            return Err(ModelValidationError::BlankUserName);
        }
        validate_email(&self.email)
    }

    /// Applies a partial update; `None` fields keep their current value.
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(name) = patch.name.as_deref() {
            self.name = name.trim().to_string();
        }
        if let Some(email) = patch.email.as_deref() {
            self.email = email.trim().to_string();
        }
        if let Some(phone) = patch.phone.as_deref() {
            self.phone = phone.trim().to_string();
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
    }
}

/// Partial user update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<UserRole>,
}

fn validate_email(email: &str) -> Result<(), ModelValidationError> {
    let trimmed = email.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ModelValidationError::InvalidEmail(email.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::{User, UserPatch, UserRole};
    use crate::model::ModelValidationError;

    #[test]
    fn role_parse_is_case_insensitive() {
        assert_eq!(UserRole::parse(" Admin ").unwrap(), UserRole::Admin);
        assert!(matches!(
            UserRole::parse("owner"),
            Err(ModelValidationError::UnknownRole(_))
        ));
    }

    #[test]
    fn validate_rejects_blank_name_and_bad_email() {
        let blank = User::new("  ", "a@b.c", "", UserRole::User);
        assert_eq!(blank.validate(), Err(ModelValidationError::BlankUserName));

        let bad_email = User::new("Alice", "alice.example.com", "", UserRole::User);
        assert!(matches!(
            bad_email.validate(),
            Err(ModelValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn apply_only_touches_present_fields() {
        let mut user = User::new("Alice", "alice@example.com", "123", UserRole::User);
        user.apply(&UserPatch {
            role: Some(UserRole::Admin),
            ..UserPatch::default()
        });
        assert_eq!(user.name, "Alice");
        assert_eq!(user.phone, "123");
        assert!(user.is_admin());
    }
}
