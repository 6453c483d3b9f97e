use thiserror::Error;

/// Invariant violations raised by the `User` aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("user name cannot be empty")]
    EmptyName,

    #[error("invalid email format")]
    InvalidEmail,
}

/// Opaque infrastructure failure carried through the repository port.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Failure kinds of the user repository port.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,

    #[error("email already exists")]
    Conflict,

    #[error("internal repository error: {0}")]
    Internal(#[from] InfraError),
}

/// Errors surfaced by the user use cases.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("user not found")]
    NotFound,

    #[error("email already exists")]
    EmailExists,

    #[error("operation cancelled")]
    Cancelled,

    #[error("operation deadline exceeded")]
    DeadlineExceeded,

    #[error("{operation}: {source}")]
    Internal {
        operation: &'static str,
        #[source]
        source: InfraError,
    },
}

impl UserError {
    /// Map a port failure onto the use-case taxonomy. `Conflict` collapses into
    /// `EmailExists`; infra causes are wrapped once with `operation`.
    pub fn from_repository(operation: &'static str, err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Conflict => Self::EmailExists,
            RepositoryError::Internal(source) => Self::Internal { operation, source },
        }
    }

    /// Whether the failure came from infrastructure rather than the caller's
    /// input. Only these are candidates for an external retry policy.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}
