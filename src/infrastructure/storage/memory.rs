//! In-memory user repository

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::{RepositoryResult, User, UserRepository};
use crate::shared::RepositoryError;

/// In-memory storage for development and testing.
///
/// `emails` is the uniqueness index: an email is claimed through its map entry
/// before the user row is written, so two concurrent writers can never both
/// own the same address.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: DashMap<Uuid, User>,
    emails: DashMap<String, Uuid>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Claim `email` for `id`. Succeeds if free or already owned by `id`.
    fn claim_email(&self, email: &str, id: Uuid) -> RepositoryResult<()> {
        match self.emails.entry(email.to_string()) {
            Entry::Occupied(owner) if *owner.get() != id => Err(RepositoryError::Conflict),
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(slot) => {
                slot.insert(id);
                Ok(())
            }
        }
    }

    fn release_email(&self, email: &str, id: Uuid) {
        self.emails.remove_if(email, |_, owner| *owner == id);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save(&self, user: &User) -> RepositoryResult<()> {
        self.claim_email(user.email(), user.id())?;
        match self.users.entry(user.id()) {
            Entry::Occupied(existing) => {
                if existing.get().email() != user.email() {
                    self.release_email(user.email(), user.id());
                }
                Err(RepositoryError::Conflict)
            }
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<User> {
        self.users
            .get(&id)
            .map(|u| u.clone())
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<User> {
        let id = self
            .emails
            .get(email)
            .map(|owner| *owner)
            .ok_or(RepositoryError::NotFound)?;
        self.find_by_id(id).await
    }

    async fn find_all(&self, limit: u64, offset: u64) -> RepositoryResult<Vec<User>> {
        let mut users: Vec<User> = self.users.iter().map(|e| e.value().clone()).collect();
        users.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        Ok(users
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect())
    }

    async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.users.len() as u64)
    }

    async fn update(&self, user: &User) -> RepositoryResult<()> {
        if !self.users.contains_key(&user.id()) {
            return Err(RepositoryError::NotFound);
        }
        self.claim_email(user.email(), user.id())?;

        let previous_email = match self.users.get_mut(&user.id()) {
            Some(mut stored) => {
                let previous = stored.email().to_string();
                *stored = user.clone();
                previous
            }
            None => {
                // Deleted between the existence check and the write
                self.release_email(user.email(), user.id());
                return Err(RepositoryError::NotFound);
            }
        };

        if previous_email != user.email() {
            self.release_email(&previous_email, user.id());
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let (_, user) = self.users.remove(&id).ok_or(RepositoryError::NotFound)?;
        self.release_email(user.email(), id);
        Ok(())
    }
}
