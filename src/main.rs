//! User service
//!
//! Reads configuration from a TOML file (~/.config/user-service/config.toml)
//! with environment overrides, then serves the REST API.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusBuilder;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use user_service::application::UserUseCases;
use user_service::config::{AppConfig, DatabaseDriver, LogFormat};
use user_service::domain::UserRepository;
use user_service::infrastructure::database::migrator::Migrator;
use user_service::interfaces::http::modules::health::HealthState;
use user_service::interfaces::http::modules::metrics::MetricsState;
use user_service::interfaces::http::modules::users::UserHandlerState;
use user_service::shared::ShutdownCoordinator;
use user_service::{
    config_path_from_env, create_api_router, init_database, ApiState, InMemoryUserRepository,
    SeaOrmUserRepository,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = config_path_from_env();
    let app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            init_tracing(&AppConfig::default());
            error!("Failed to load config from {}: {}", config_path.display(), e);
            return Err(e.into());
        }
    };

    init_tracing(&app_cfg);
    info!("Configuration loaded from {}", config_path.display());

    info!("Starting user service v{}...", env!("CARGO_PKG_VERSION"));

    // ── Prometheus metrics recorder (before any metrics calls) ──
    let metrics = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            info!("Prometheus metrics recorder installed");
            Some(MetricsState { handle })
        }
        Err(e) => {
            warn!("Prometheus recorder unavailable, /metrics disabled: {}", e);
            None
        }
    };

    // ── Storage ────────────────────────────────────────────────
    let (repo, db): (Arc<dyn UserRepository>, Option<DatabaseConnection>) =
        match app_cfg.database.driver {
            DatabaseDriver::Memory => {
                warn!("Using in-memory user store; data will not survive a restart");
                (Arc::new(InMemoryUserRepository::new()), None)
            }
            DatabaseDriver::Sqlite | DatabaseDriver::Postgres => {
                let db_config = app_cfg.database.to_database_config();

                let db = match init_database(&db_config).await {
                    Ok(db) => db,
                    Err(e) => {
                        error!("Failed to connect to database: {}", e);
                        return Err(e.into());
                    }
                };

                info!("Running database migrations...");
                if let Err(e) = Migrator::up(&db, None).await {
                    error!("Failed to run migrations: {}", e);
                    return Err(e.into());
                }
                info!("Migrations completed");

                (Arc::new(SeaOrmUserRepository::new(db.clone())), Some(db))
            }
        };

    // ── Shutdown ───────────────────────────────────────────────
    let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
    let shutdown_signal = shutdown.signal();
    shutdown.start_signal_listener();

    // ── REST API ───────────────────────────────────────────────
    let api_router = create_api_router(ApiState {
        users: UserHandlerState {
            use_cases: UserUseCases::new(repo),
            shutdown: shutdown_signal.clone(),
            request_timeout: app_cfg.server.request_timeout(),
        },
        health: HealthState::new(db.clone()),
        metrics,
    });

    let api_addr = app_cfg.server.address();
    let listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("REST API server listening on http://{}", api_addr);
    info!("Swagger UI available at http://{}/docs/", api_addr);

    let graceful = shutdown_signal.clone();
    let server = tokio::spawn(async move {
        let result = axum::serve(listener, api_router)
            .with_graceful_shutdown(async move {
                graceful.wait().await;
                info!("REST API server received shutdown signal");
            })
            .await;
        // An early exit still tears everything down
        shutdown_signal.trigger();
        result
    });

    let drained = shutdown
        .shutdown_with_cleanup(|| async move {
            match server.await {
                Ok(Ok(())) => info!("REST API server stopped"),
                Ok(Err(e)) => error!("REST API server error: {}", e),
                Err(e) => error!("REST API server task panicked: {}", e),
            }
        })
        .await;
    if !drained {
        warn!("In-flight requests abandoned");
    }

    if let Some(db) = db {
        if let Err(e) = db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("Database connection closed");
        }
    }

    info!("User service shutdown complete");
    Ok(())
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(cfg: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.logging.level));

    match cfg.log_format() {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}
