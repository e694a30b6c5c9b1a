use std::{env, fmt::Display, str::FromStr, time::Duration};

use log::*;
use pos_common::parse_boolean_flag;
use pos_order_engine::{events::DEFAULT_SUBSCRIBER_QUEUE_SIZE, DatabaseOptions};

const DEFAULT_POS_HOST: &str = "127.0.0.1";
const DEFAULT_POS_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/pos_store.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The size of the database connection pool.
    pub max_connections: u32,
    /// The longest an order commit will wait on locks held by concurrent commits before giving up.
    pub lock_timeout: Duration,
    /// The number of undelivered events kept for each live-view subscriber before the oldest are dropped.
    pub subscriber_queue_size: usize,
    /// If true, the embedded database migrations are applied at start-up.
    pub run_migrations: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_POS_HOST.to_string(),
            port: DEFAULT_POS_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            lock_timeout: Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS),
            subscriber_queue_size: DEFAULT_SUBSCRIBER_QUEUE_SIZE,
            run_migrations: true,
        }
    }
}

impl ServerConfig {
    pub fn from_env_or_default() -> Self {
        let host = env::var("POS_HOST").ok().unwrap_or_else(|| DEFAULT_POS_HOST.into());
        let port = parse_env("POS_PORT", DEFAULT_POS_PORT);
        let database_url = env::var("POS_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ POS_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let max_connections = parse_env("POS_DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS);
        let lock_timeout = Duration::from_millis(parse_env("POS_LOCK_TIMEOUT_MS", DEFAULT_LOCK_TIMEOUT_MS));
        let subscriber_queue_size = parse_env("POS_SUBSCRIBER_QUEUE_SIZE", DEFAULT_SUBSCRIBER_QUEUE_SIZE);
        if subscriber_queue_size == 0 {
            warn!("🪛️ POS_SUBSCRIBER_QUEUE_SIZE is zero. Each subscriber will hold at most one undelivered event.");
        }
        let run_migrations = parse_boolean_flag(env::var("POS_RUN_MIGRATIONS").ok(), true);
        Self { host, port, database_url, max_connections, lock_timeout, subscriber_queue_size, run_migrations }
    }

    pub fn database_options(&self) -> DatabaseOptions {
        DatabaseOptions::default().with_max_connections(self.max_connections).with_lock_timeout(self.lock_timeout)
    }
}

fn parse_env<T>(name: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(name) {
        Ok(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            error!("🪛️ {s} is not a valid value for {name}. {e} Using the default, {default}, instead.");
            default
        }),
        Err(_) => default,
    }
}
