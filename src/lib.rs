//! # User Service
//!
//! User account management: create, read, list, update and delete users with
//! case-insensitive unique emails.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: the `User` aggregate and the `UserRepository` port
//! - **application**: the user use cases
//! - **infrastructure**: SeaORM and in-memory repository adapters
//! - **interfaces**: REST API with Swagger documentation
//! - **shared**: error taxonomy, request context, shutdown, pagination

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod shared;

pub use config::{config_path_from_env, default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig, InMemoryUserRepository, SeaOrmUserRepository};

// Re-export API router
pub use interfaces::{create_api_router, ApiState};
