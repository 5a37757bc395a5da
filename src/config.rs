// src/config.rs

use dotenvy::dotenv;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub max_connections: u32,
    /// Upper bound on a single store operation.
    pub query_timeout: Duration,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://grades.db".to_string(),
            rust_log: "info".to_string(),
            max_connections: 5,
            query_timeout: Duration::from_secs(5),
            admin_username: None,
            admin_password: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let defaults = Self::default();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or(defaults.database_url);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or(defaults.rust_log);

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.max_connections);

        let query_timeout = env::var("DB_QUERY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.query_timeout);

        let admin_username = env::var("ADMIN_USERNAME").ok();
        let admin_password = env::var("ADMIN_PASSWORD").ok();

        Self {
            database_url,
            rust_log,
            max_connections,
            query_timeout,
            admin_username,
            admin_password,
        }
    }
}
