// src/error.rs

use thiserror::Error;

/// Errors surfaced by the grade store.
///
/// Expected outcomes such as "exercise already exists" or "unknown user" are
/// not errors; they are reported through the operation's return type.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connectivity or query execution failure.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// Schema initialization failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The named operation did not finish within the configured bound.
    #[error("operation `{0}` timed out")]
    Timeout(&'static str),

    // e.g. an explicit submission id that is already taken
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    BadRequest(String),

    #[error("password hashing failed: {0}")]
    Hash(String),

    /// A stored value could not be decoded into the model.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Converts `sqlx::Error` into `StoreError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => StoreError::Timeout("acquire connection"),
            other => StoreError::Database(other),
        }
    }
}

impl From<validator::ValidationErrors> for StoreError {
    fn from(err: validator::ValidationErrors) -> Self {
        StoreError::BadRequest(err.to_string())
    }
}

impl StoreError {
    /// True when the underlying database rejected a write on a unique key.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            StoreError::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}
