use std::sync::Arc;

use uuid::Uuid;

use super::UserOutput;
use crate::domain::UserRepository;
use crate::shared::{RequestContext, UserError};

pub struct GetUserUseCase {
    repo: Arc<dyn UserRepository>,
}

impl GetUserUseCase {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, ctx: &RequestContext, id: Uuid) -> Result<UserOutput, UserError> {
        let user = ctx
            .run(self.repo.find_by_id(id))
            .await?
            .map_err(|e| UserError::from_repository("failed to find user", e))?;

        Ok(UserOutput::from(user))
    }
}
