//! Domain layer: the User aggregate and its storage port

pub mod user;

pub use user::{normalize_email, RepositoryResult, User, UserRepository};
