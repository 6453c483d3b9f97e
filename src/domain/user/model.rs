//! User aggregate root

use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;
use validator::ValidateEmail;

use crate::shared::ValidationError;

/// User aggregate.
///
/// Fields are private: a live `User` always has a non-empty trimmed name, a
/// well-formed lowercase email and `updated_at >= created_at`. The only ways to
/// obtain one are [`User::new`], which validates, and [`User::rehydrate`],
/// reserved for persistence adapters loading rows that were validated on write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: Uuid,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a fresh id and timestamps.
    pub fn new(name: &str, email: &str) -> Result<Self, ValidationError> {
        let name = validate_name(name)?;
        let email = validate_email(email)?;

        let now = now();
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            email,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuild a user from storage. Performs no validation.
    pub fn rehydrate(
        id: Uuid,
        name: String,
        email: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            created_at,
            updated_at,
        }
    }

    pub fn update_name(&mut self, name: &str) -> Result<(), ValidationError> {
        self.name = validate_name(name)?;
        self.touch();
        Ok(())
    }

    pub fn update_email(&mut self, email: &str) -> Result<(), ValidationError> {
        self.email = validate_email(email)?;
        self.touch();
        Ok(())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // Wall clock may step backwards; updated_at must not.
    fn touch(&mut self) {
        self.updated_at = now().max(self.updated_at);
    }
}

/// Current time at microsecond precision, the finest Postgres `timestamptz`
/// keeps, so values survive a store round trip unchanged.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Canonical form of an email address: trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(name.to_string())
}

fn validate_email(email: &str) -> Result<String, ValidationError> {
    let email = normalize_email(email);
    if email.is_empty() || !email.as_str().validate_email() {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(email)
}
