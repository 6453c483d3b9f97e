//! Use-case input/output values
//!
//! Plain data decoupling the use cases from the delivery layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::User;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateUserInput {
    pub name: String,
    pub email: String,
}

/// Partial update. `None` leaves the field untouched, `Some("")` is still
/// validated and rejected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateUserInput {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListUsersInput {
    pub limit: u64,
    pub offset: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOutput {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserOutput {
    fn from(u: &User) -> Self {
        Self {
            id: u.id(),
            name: u.name().to_string(),
            email: u.email().to_string(),
            created_at: u.created_at(),
            updated_at: u.updated_at(),
        }
    }
}

impl From<User> for UserOutput {
    fn from(u: User) -> Self {
        Self::from(&u)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListUsersOutput {
    pub users: Vec<UserOutput>,
    pub total: u64,
}
