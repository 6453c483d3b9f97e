use std::sync::Arc;

use tracing::info;

use super::create_user::ensure_email_available;
use super::{UpdateUserInput, UserOutput};
use crate::domain::{normalize_email, UserRepository};
use crate::shared::{RequestContext, UserError};

pub struct UpdateUserUseCase {
    repo: Arc<dyn UserRepository>,
}

impl UpdateUserUseCase {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        ctx: &RequestContext,
        input: UpdateUserInput,
    ) -> Result<UserOutput, UserError> {
        let mut user = ctx
            .run(self.repo.find_by_id(input.id))
            .await?
            .map_err(|e| UserError::from_repository("failed to find user", e))?;

        if let Some(email) = input.email.as_deref() {
            let email_normalized = normalize_email(email);
            // Same address in another case is not a change
            if email_normalized != user.email() {
                ensure_email_available(self.repo.as_ref(), ctx, &email_normalized).await?;
                user.update_email(email)?;
            }
        }

        if let Some(name) = input.name.as_deref() {
            user.update_name(name)?;
        }

        ctx.run(self.repo.update(&user))
            .await?
            .map_err(|e| UserError::from_repository("failed to update user", e))?;

        info!(user_id = %user.id(), "user updated");
        Ok(UserOutput::from(&user))
    }
}
