//! Infrastructure layer - storage adapters behind the user repository port

pub mod database;
pub mod storage;

pub use database::{init_database, DatabaseConfig, SeaOrmUserRepository};
pub use storage::InMemoryUserRepository;
