// src/store/mod.rs

//! The grade store handle and its lifecycle.
//!
//! Operations are split by entity into `users`, `exercises` and `submissions`;
//! every one of them runs under [`GradeStore::bounded`].

mod exercises;
mod submissions;
mod users;

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::config::Config;
use crate::error::{StoreError, StoreResult};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Owned handle over the grades database.
///
/// Cloning is cheap and shares the underlying pool.
#[derive(Clone)]
pub struct GradeStore {
    pool: SqlitePool,
    query_timeout: Duration,
}

impl GradeStore {
    /// Opens (creating if necessary) the store at `config.database_url` and
    /// makes sure all tables exist.
    pub async fn open(config: &Config) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            // Writers queue on the file lock instead of failing with SQLITE_BUSY.
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options)
            .await?;

        Self::with_pool(pool, config.query_timeout).await
    }

    /// Opens a private in-memory store, mostly useful for tests.
    pub async fn open_in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        // Every connection to `:memory:` is a separate database, so the pool
        // must hold exactly one connection and never recycle it.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::with_pool(pool, Config::default().query_timeout).await
    }

    /// Wraps an existing pool and applies the schema.
    pub async fn with_pool(pool: SqlitePool, query_timeout: Duration) -> StoreResult<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::debug!("Grade store schema is up to date.");

        Ok(Self {
            pool,
            query_timeout,
        })
    }

    /// Closes every connection. The handle is consumed.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::debug!("Grade store closed.");
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Runs one store operation, failing with [`StoreError::Timeout`] when it
    /// exceeds the configured bound. An open transaction inside `fut` is
    /// rolled back when the future is dropped.
    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => {
                if let Err(e) = &result {
                    tracing::error!("Grade store operation `{}` failed: {}", op, e);
                }
                result
            }
            Err(_) => {
                tracing::warn!(
                    "Grade store operation `{}` exceeded {:?}",
                    op,
                    self.query_timeout
                );
                Err(StoreError::Timeout(op))
            }
        }
    }
}

pub(crate) fn to_millis(at: &DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub(crate) fn from_millis(ms: i64) -> StoreResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| StoreError::Corrupt(format!("timestamp {} is out of range", ms)))
}
