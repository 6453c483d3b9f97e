//! HTTP REST API
//!
//! - `common`: error body, status mapping and extractors
//! - `modules`: handlers grouped by resource, plus middleware
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod modules;
pub mod router;

pub use router::{create_api_router, ApiDoc, ApiState};
