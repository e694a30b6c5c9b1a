pub mod db;
mod errors;

pub mod orders;
pub mod products;

use std::{env, str::FromStr, time::Duration};

pub use db::SqliteDatabase;
pub use errors::SqliteDatabaseError;
use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

const SQLITE_DB_URL: &str = "sqlite://data/pos_store.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

pub fn db_url() -> String {
    let result = env::var("POS_DATABASE_URL").unwrap_or_else(|_| {
        info!("POS_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

/// Connection pool tuning for the SQLite backend.
#[derive(Debug, Clone, Copy)]
pub struct DatabaseOptions {
    pub max_connections: u32,
    /// The longest a transaction will wait for a lock held by a concurrent writer, and the longest a caller will wait
    /// for a pooled connection. Exceeding it aborts the operation with a retryable error.
    pub lock_timeout: Duration,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self { max_connections: DEFAULT_MAX_CONNECTIONS, lock_timeout: DEFAULT_LOCK_TIMEOUT }
    }
}

impl DatabaseOptions {
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }
}

pub async fn new_pool(url: &str, options: DatabaseOptions) -> Result<SqlitePool, SqliteDatabaseError> {
    let connect_options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(options.lock_timeout);
    let pool = SqlitePoolOptions::new()
        .max_connections(options.max_connections)
        .acquire_timeout(options.lock_timeout)
        .connect_with(connect_options)
        .await?;
    Ok(pool)
}
