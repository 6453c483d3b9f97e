//! User DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::{CreateUserInput, ListUsersOutput, UserOutput};
use crate::shared::PaginationParams;

/// User API representation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserOutput> for UserDto {
    fn from(u: UserOutput) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Create user request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
}

impl From<CreateUserRequest> for CreateUserInput {
    fn from(r: CreateUserRequest) -> Self {
        Self {
            name: r.name,
            email: r.email,
        }
    }
}

/// Update user request; omitted fields are left unchanged
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// List users query parameters.
///
/// Kept as raw strings: a malformed value falls back to its default
/// instead of failing the request.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersParams {
    /// Page size (default 10, max 100)
    #[param(value_type = Option<i64>)]
    pub limit: Option<String>,
    /// Number of users to skip (default 0)
    #[param(value_type = Option<i64>)]
    pub offset: Option<String>,
}

impl ListUsersParams {
    pub fn limit(&self) -> Option<i64> {
        self.limit.as_deref().and_then(|v| v.trim().parse().ok())
    }

    pub fn offset(&self) -> Option<i64> {
        self.offset.as_deref().and_then(|v| v.trim().parse().ok())
    }
}

/// One page of users
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    pub users: Vec<UserDto>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

impl UserListResponse {
    pub fn new(output: ListUsersOutput, page: PaginationParams) -> Self {
        Self {
            users: output.users.into_iter().map(UserDto::from).collect(),
            total: output.total,
            limit: page.limit,
            offset: page.offset,
        }
    }
}
