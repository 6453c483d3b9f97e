use std::sync::Arc;

use super::{ListUsersInput, ListUsersOutput, UserOutput};
use crate::domain::UserRepository;
use crate::shared::{RequestContext, UserError};

/// Lists users newest first. `limit`/`offset` are taken as given; defaults
/// and caps belong to the caller.
pub struct ListUsersUseCase {
    repo: Arc<dyn UserRepository>,
}

impl ListUsersUseCase {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        ctx: &RequestContext,
        input: ListUsersInput,
    ) -> Result<ListUsersOutput, UserError> {
        let users = ctx
            .run(self.repo.find_all(input.limit, input.offset))
            .await?
            .map_err(|e| UserError::from_repository("failed to list users", e))?;

        let total = ctx
            .run(self.repo.count())
            .await?
            .map_err(|e| UserError::from_repository("failed to count users", e))?;

        Ok(ListUsersOutput {
            users: users.into_iter().map(UserOutput::from).collect(),
            total,
        })
    }
}
