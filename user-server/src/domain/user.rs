use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::{DomainError, FieldError};

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 100;
pub const EMAIL_MAX_LEN: usize = 100;
pub const AGE_MIN: i32 = 1;
pub const AGE_MAX: i32 = 150;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, age: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            age,
            created_at: Utc::now(),
        }
    }
}

/// Input of the create operation, before an id and timestamp are assigned.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub age: i32,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>, age: i32) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            age,
        }
    }

    /// Trims text fields and checks every constraint, collecting all failures.
    pub fn normalized(self) -> Result<Self, DomainError> {
        let name = self.name.trim().to_string();
        let email = self.email.trim().to_string();
        let mut errors = Vec::new();

        if name.is_empty() {
            errors.push(FieldError::new("name", "name must not be blank"));
        } else if let Some(err) = check_name(&name) {
            errors.push(err);
        }
        if email.is_empty() {
            errors.push(FieldError::new("email", "email must not be blank"));
        } else if let Some(err) = check_email(&email) {
            errors.push(err);
        }
        if !age_in_range(self.age) {
            errors.push(age_error());
        }

        if errors.is_empty() {
            Ok(Self {
                name,
                email,
                age: self.age,
            })
        } else {
            Err(DomainError::Validation(errors))
        }
    }
}

/// A single field of a partial update.
///
/// `Keep` leaves the stored value alone. It is kept distinct from `Set("")`
/// so that clearing a field stays expressible, even though blank text is
/// currently treated the same as `Keep`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    Keep,
    Set(T),
}

impl<T> FieldUpdate<T> {
    pub fn as_set(&self) -> Option<&T> {
        match self {
            FieldUpdate::Keep => None,
            FieldUpdate::Set(value) => Some(value),
        }
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, FieldUpdate::Keep)
    }
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        FieldUpdate::Keep
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldUpdate::Keep, FieldUpdate::Set)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: FieldUpdate<String>,
    pub email: FieldUpdate<String>,
    pub age: FieldUpdate<i32>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_keep() && self.email.is_keep() && self.age.is_keep()
    }

    /// Checks the shape of the proposed text values.
    ///
    /// Blank strings are skipped since the reconciliation ignores them. Age
    /// range is left to the reconciliation, which reports it as `InvalidAge`.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = Vec::new();

        if let Some(name) = non_blank(&self.name) {
            errors.extend(check_name(name));
        }
        if let Some(email) = non_blank(&self.email) {
            errors.extend(check_email(email));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(errors))
        }
    }
}

pub fn age_in_range(age: i32) -> bool {
    (AGE_MIN..=AGE_MAX).contains(&age)
}

fn non_blank(field: &FieldUpdate<String>) -> Option<&str> {
    field
        .as_set()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn check_name(name: &str) -> Option<FieldError> {
    let len = name.chars().count();
    if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&len) {
        return Some(FieldError::new(
            "name",
            format!("name must be between {NAME_MIN_LEN} and {NAME_MAX_LEN} characters"),
        ));
    }
    None
}

fn check_email(email: &str) -> Option<FieldError> {
    if email.chars().count() > EMAIL_MAX_LEN {
        return Some(FieldError::new(
            "email",
            format!("email must be at most {EMAIL_MAX_LEN} characters"),
        ));
    }
    if !looks_like_email(email) {
        return Some(FieldError::new("email", "invalid email format"));
    }
    None
}

fn age_error() -> FieldError {
    FieldError::new(
        "age",
        format!("age must be between {AGE_MIN} and {AGE_MAX}"),
    )
}

fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}
