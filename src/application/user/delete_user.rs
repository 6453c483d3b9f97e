use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::domain::UserRepository;
use crate::shared::{RequestContext, UserError};

/// Deletes a user. The existence check and the delete are separate round
/// trips; a concurrent delete in between surfaces as `NotFound` just like an
/// id that never existed.
pub struct DeleteUserUseCase {
    repo: Arc<dyn UserRepository>,
}

impl DeleteUserUseCase {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, ctx: &RequestContext, id: Uuid) -> Result<(), UserError> {
        ctx.run(self.repo.find_by_id(id))
            .await?
            .map_err(|e| UserError::from_repository("failed to find user", e))?;

        ctx.run(self.repo.delete(id))
            .await?
            .map_err(|e| UserError::from_repository("failed to delete user", e))?;

        info!(user_id = %id, "user deleted");
        Ok(())
    }
}
