//! Application layer: user use cases

pub mod user;

pub use user::{
    CreateUserInput, ListUsersInput, ListUsersOutput, UpdateUserInput, UserOutput, UserUseCases,
};
