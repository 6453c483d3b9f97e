//! API router with Swagger UI

use axum::{
    http::Method,
    middleware,
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::common::ErrorResponse;
use super::modules::health::{self, HealthState};
use super::modules::metrics::{self, http_metrics_middleware, MetricsState};
use super::modules::request_id::request_id_middleware;
use super::modules::users::{self, UserHandlerState};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        users::create_user,
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
    ),
    components(
        schemas(
            ErrorResponse,
            health::HealthResponse,
            health::ComponentHealth,
            users::UserDto,
            users::CreateUserRequest,
            users::UpdateUserRequest,
            users::UserListResponse,
        )
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Users", description = "User account management"),
    ),
    info(
        title = "User Service API",
        version = "1.0.0",
        description = "REST API for managing user accounts",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Everything the router needs from bootstrap.
#[derive(Clone)]
pub struct ApiState {
    pub users: UserHandlerState,
    pub health: HealthState,
    /// `None` when no Prometheus recorder is installed; `/metrics` is then
    /// not mounted.
    pub metrics: Option<MetricsState>,
}

/// Create the API router with all routes
pub fn create_api_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    let user_routes = Router::new()
        .route(
            "/api/v1/users",
            get(users::list_users).post(users::create_user),
        )
        .route(
            "/api/v1/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .with_state(state.users);

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(state.health);

    let mut router = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(health_routes)
        .merge(user_routes);

    if let Some(metrics_state) = state.metrics {
        router = router.merge(
            Router::new()
                .route("/metrics", get(metrics::prometheus_metrics))
                .with_state(metrics_state),
        );
    }

    router
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
}
