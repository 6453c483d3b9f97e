//! Configuration module
//!
//! Settings come from a TOML file (`~/.config/user-service/config.toml` unless
//! `USER_SERVICE_CONFIG` points elsewhere); environment variables override
//! individual values afterwards.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::infrastructure::DatabaseConfig;

/// Env var holding an explicit config file path
pub const CONFIG_PATH_ENV: &str = "USER_SERVICE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },
}

/// Full application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseSettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Deadline applied to every use-case call made by a request
    pub request_timeout_secs: u64,
    /// Grace period for in-flight requests on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 15,
            shutdown_timeout: 30,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    #[default]
    Sqlite,
    Postgres,
    /// Process-local store; data is lost on exit
    Memory,
}

/// Database settings; `url` wins over the individual connection fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub driver: DatabaseDriver,
    pub url: Option<String>,
    pub path: String,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub sslmode: String,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            driver: DatabaseDriver::Sqlite,
            url: None,
            path: "./users.db".to_string(),
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            name: "userdb".to_string(),
            sslmode: "disable".to_string(),
            max_connections: 10,
        }
    }
}

impl DatabaseSettings {
    pub fn connection_url(&self) -> String {
        if let Some(url) = self.url.as_deref().filter(|u| !u.is_empty()) {
            return url.to_string();
        }
        match self.driver {
            DatabaseDriver::Postgres => format!(
                "postgres://{}:{}@{}:{}/{}?sslmode={}",
                self.user, self.password, self.host, self.port, self.name, self.sslmode
            ),
            DatabaseDriver::Sqlite | DatabaseDriver::Memory => {
                format!("sqlite://{}?mode=rwc", self.path)
            }
        }
    }

    pub fn to_database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.connection_url(),
            max_connections: self.max_connections,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Defaults to `json` in production and `pretty` otherwise
    pub format: Option<LogFormat>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: None,
        }
    }
}

impl AppConfig {
    /// Read `path` (missing file means defaults) and apply env overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// [`AppConfig::load`] with an explicit env lookup.
    pub fn load_with<F>(path: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            Self::default()
        };
        cfg.apply_env(lookup)?;
        Ok(cfg)
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Apply overrides using the given lookup; empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get("ENV") {
            self.environment = Environment::parse(&v);
        }
        if let Some(v) = get("HTTP_PORT") {
            self.server.port = parse_env("HTTP_PORT", v)?;
        }
        if let Some(v) = get("LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = get("DB_DRIVER") {
            self.database.driver = match v.to_lowercase().as_str() {
                "sqlite" => DatabaseDriver::Sqlite,
                "postgres" | "postgresql" => DatabaseDriver::Postgres,
                "memory" => DatabaseDriver::Memory,
                _ => return Err(ConfigError::InvalidEnv { key: "DB_DRIVER", value: v }),
            };
        }
        if let Some(v) = get("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Some(v) = get("DB_HOST") {
            self.database.host = v;
        }
        if let Some(v) = get("DB_PORT") {
            self.database.port = parse_env("DB_PORT", v)?;
        }
        if let Some(v) = get("DB_USER") {
            self.database.user = v;
        }
        if let Some(v) = get("DB_PASSWORD") {
            self.database.password = v;
        }
        if let Some(v) = get("DB_NAME") {
            self.database.name = v;
        }
        if let Some(v) = get("DB_SSLMODE") {
            self.database.sslmode = v;
        }
        Ok(())
    }

    pub fn log_format(&self) -> LogFormat {
        self.logging.format.unwrap_or(match self.environment {
            Environment::Production => LogFormat::Json,
            Environment::Development => LogFormat::Pretty,
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { key, value })
}

/// `<config dir>/user-service/config.toml`, or `./config.toml` when the
/// platform has no config dir.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("user-service"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("config.toml")
}

/// Config path from `USER_SERVICE_CONFIG`, falling back to the default.
pub fn config_path_from_env() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_config_path())
}
