//! Users module: CRUD over the user use cases

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
