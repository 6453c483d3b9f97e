//! User repository port
//!
//! The storage contract the user use cases depend on. Adapters must enforce
//! email uniqueness atomically on `save` and `update` (unique index, atomic map
//! entry, ...): the use cases only pre-check, and two concurrent writers can
//! both pass that check.

use async_trait::async_trait;
use uuid::Uuid;

use super::User;
use crate::shared::RepositoryError;

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user. `Conflict` if the email is already taken.
    async fn save(&self, user: &User) -> RepositoryResult<()>;

    /// `NotFound` if no user has this id.
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<User>;

    /// Lookup by normalized email. `NotFound` if absent.
    async fn find_by_email(&self, email: &str) -> RepositoryResult<User>;

    /// Users ordered by `created_at` descending, sliced to
    /// `[offset, offset + limit)`.
    async fn find_all(&self, limit: u64, offset: u64) -> RepositoryResult<Vec<User>>;

    /// Total number of stored users.
    async fn count(&self) -> RepositoryResult<u64>;

    /// Overwrite name, email and `updated_at` of an existing user.
    /// `NotFound` if the id is absent, `Conflict` if the email belongs to
    /// another user.
    async fn update(&self, user: &User) -> RepositoryResult<()>;

    /// `NotFound` if no user has this id.
    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;
}
