//! User aggregate
//!
//! Contains the User entity and the repository port.

pub mod model;
pub mod repository;

pub use model::{normalize_email, User};
pub use repository::{RepositoryResult, UserRepository};

#[cfg(test)]
pub use repository::MockUserRepository;
