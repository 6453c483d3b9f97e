//! User use cases
//!
//! Each use case owns an `Arc<dyn UserRepository>` injected at construction
//! and keeps no other state, so one instance serves any number of concurrent
//! requests. Every repository call runs under the caller's
//! [`RequestContext`](crate::shared::RequestContext).

mod create_user;
mod delete_user;
mod dto;
mod get_user;
mod list_users;
mod update_user;

use std::sync::Arc;

pub use create_user::CreateUserUseCase;
pub use delete_user::DeleteUserUseCase;
pub use dto::{CreateUserInput, ListUsersInput, ListUsersOutput, UpdateUserInput, UserOutput};
pub use get_user::GetUserUseCase;
pub use list_users::ListUsersUseCase;
pub use update_user::UpdateUserUseCase;

use crate::domain::UserRepository;

/// The five user use cases wired to one repository.
#[derive(Clone)]
pub struct UserUseCases {
    pub create: Arc<CreateUserUseCase>,
    pub get: Arc<GetUserUseCase>,
    pub list: Arc<ListUsersUseCase>,
    pub update: Arc<UpdateUserUseCase>,
    pub delete: Arc<DeleteUserUseCase>,
}

impl UserUseCases {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self {
            create: Arc::new(CreateUserUseCase::new(repo.clone())),
            get: Arc::new(GetUserUseCase::new(repo.clone())),
            list: Arc::new(ListUsersUseCase::new(repo.clone())),
            update: Arc::new(UpdateUserUseCase::new(repo.clone())),
            delete: Arc::new(DeleteUserUseCase::new(repo)),
        }
    }
}

#[cfg(test)]
mod tests;
