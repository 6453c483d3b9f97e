use std::sync::Arc;

use tracing::info;

use super::{CreateUserInput, UserOutput};
use crate::domain::{normalize_email, User, UserRepository};
use crate::shared::{RepositoryError, RequestContext, UserError};

/// Registers a new user with a unique email.
pub struct CreateUserUseCase {
    repo: Arc<dyn UserRepository>,
}

impl CreateUserUseCase {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        ctx: &RequestContext,
        input: CreateUserInput,
    ) -> Result<UserOutput, UserError> {
        ensure_email_available(self.repo.as_ref(), ctx, &normalize_email(&input.email)).await?;

        let user = User::new(&input.name, &input.email)?;

        // The store's unique constraint is the real gate; a concurrent create
        // can slip past the pre-check above.
        ctx.run(self.repo.save(&user))
            .await?
            .map_err(|e| UserError::from_repository("failed to save user", e))?;

        info!(user_id = %user.id(), "user created");
        Ok(UserOutput::from(&user))
    }
}

/// Fast-path uniqueness check shared by create and update.
pub(super) async fn ensure_email_available(
    repo: &dyn UserRepository,
    ctx: &RequestContext,
    email: &str,
) -> Result<(), UserError> {
    match ctx.run(repo.find_by_email(email)).await? {
        Ok(_) => Err(UserError::EmailExists),
        Err(RepositoryError::NotFound) => Ok(()),
        Err(e) => Err(UserError::from_repository("failed to check email existence", e)),
    }
}
