//! User CRUD handlers
//!
//! Each request gets its own `RequestContext`, a child of the shutdown
//! signal bounded by the configured request timeout, and hands it to the
//! matching use case.

use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::dto::{CreateUserRequest, ListUsersParams, UpdateUserRequest, UserDto, UserListResponse};
use crate::application::{ListUsersInput, UpdateUserInput, UserUseCases};
use crate::interfaces::http::common::{ApiError, ApiJson, ApiPath, ErrorResponse};
use crate::shared::{validate_pagination, RequestContext, ShutdownSignal};

/// User handler state
#[derive(Clone)]
pub struct UserHandlerState {
    pub use_cases: UserUseCases,
    pub shutdown: ShutdownSignal,
    pub request_timeout: Duration,
}

impl UserHandlerState {
    fn context(&self) -> RequestContext {
        self.shutdown.request_context(self.request_timeout)
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserDto),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Email already exists", body = ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<UserHandlerState>,
    ApiJson(request): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    let user = state
        .use_cases
        .create
        .execute(&state.context(), request.into())
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    params(ListUsersParams),
    responses(
        (status = 200, description = "User list, newest first", body = UserListResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<UserHandlerState>,
    Query(params): Query<ListUsersParams>,
) -> Result<Json<UserListResponse>, ApiError> {
    let page = validate_pagination(params.limit(), params.offset());
    let output = state
        .use_cases
        .list
        .execute(
            &state.context(),
            ListUsersInput {
                limit: page.limit,
                offset: page.offset,
            },
        )
        .await?;
    Ok(Json(UserListResponse::new(output, page)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = UserDto),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn get_user(
    State(state): State<UserHandlerState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<UserDto>, ApiError> {
    let user = state.use_cases.get.execute(&state.context(), id).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserDto),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 409, description = "Email already exists", body = ErrorResponse)
    )
)]
pub async fn update_user(
    State(state): State<UserHandlerState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateUserRequest>,
) -> Result<Json<UserDto>, ApiError> {
    let input = UpdateUserInput {
        id,
        name: request.name,
        email: request.email,
    };
    let user = state.use_cases.update.execute(&state.context(), input).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn delete_user(
    State(state): State<UserHandlerState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.use_cases.delete.execute(&state.context(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
