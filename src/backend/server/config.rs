/**
 * Server Configuration
 *
 * Loads `AppConfig` from its layers and opens the SQLite pool.
 *
 * # Configuration Sources
 *
 * 1. Built-in defaults
 * 2. TOML file named by `DUOCHAT_CONFIG` (optional)
 * 3. Environment variables (a `.env` file is read by `main`)
 *
 * # Error Handling
 *
 * Unlike a best-effort service, the chat server cannot run without its
 * database or signing secret, so every failure here is a `StartupError`
 * and startup aborts.
 */

use sqlx::migrate::MigrateError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError};

/// Environment variable naming an optional TOML config file
pub const CONFIG_PATH_ENV: &str = "DUOCHAT_CONFIG";

/// How long a connection waits on another connection's write lock
const DB_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that abort server startup
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] MigrateError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Load the configuration from the optional file and the process environment
pub fn load_config() -> Result<AppConfig, StartupError> {
    let mut builder = AppConfig::builder();

    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        tracing::info!("[Config] Reading {}", path);
        let source = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        builder = builder.merge_toml(&source)?;
    }

    let builder = apply_env(builder, |key| std::env::var(key).ok())?;
    Ok(builder.build()?)
}

/// Layer environment values over `builder`
///
/// `lookup` is injected so tests don't have to mutate the process env.
pub fn apply_env<F>(mut builder: AppConfigBuilder, lookup: F) -> Result<AppConfigBuilder, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("DATABASE_URL") {
        builder = builder.database_url(url);
    }
    if let Some(secret) = lookup("JWT_SECRET") {
        builder = builder.jwt_secret(secret);
    }
    if let Some(addr) = lookup("SERVER_ADDR") {
        builder = builder.server_addr(addr);
    }
    if let Some(port) = parse_env(&lookup, "SERVER_PORT")? {
        builder = builder.server_port(port);
    }
    if let Some(ttl) = parse_env(&lookup, "TOKEN_TTL_SECS")? {
        builder = builder.token_ttl_secs(ttl);
    }
    if let Some(cost) = parse_env(&lookup, "PASSWORD_HASH_COST")? {
        builder = builder.password_hash_cost(cost);
    }
    if let Some(max) = parse_env(&lookup, "DB_MAX_CONNECTIONS")? {
        builder = builder.db_max_connections(max);
    }
    if let Some(len) = parse_env(&lookup, "MAX_MESSAGE_LENGTH")? {
        builder = builder.max_message_length(len);
    }
    if let Some(secs) = parse_env(&lookup, "LOCK_CLEANUP_INTERVAL_SECS")? {
        builder = builder.lock_cleanup_interval_secs(secs);
    }

    let mut ws = builder.ws_config();
    if let Some(required) = parse_env(&lookup, "WS_REQUIRE_JOIN_TOKEN")? {
        ws.require_join_token = required;
    }
    if let Some(secs) = parse_env(&lookup, "WS_PING_INTERVAL_SECS")? {
        ws.ping_interval_secs = secs;
    }
    if let Some(secs) = parse_env(&lookup, "WS_IDLE_TIMEOUT_SECS")? {
        ws.idle_timeout_secs = secs;
    }
    Ok(builder.ws(ws))
}

fn parse_env<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::invalid(key, e.to_string())),
        None => Ok(None),
    }
}

/// Open the pool described by `config` and run migrations
pub async fn load_database(config: &AppConfig) -> Result<SqlitePool, StartupError> {
    tracing::info!("[Database] Connecting...");

    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(DB_BUSY_TIMEOUT);
    let pool = SqlitePoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect_with(options)
        .await?;

    tracing::info!("[Database] Running migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("[Database] Ready");

    Ok(pool)
}

/// A migrated in-memory database
///
/// Pinned to a single connection that never expires, since each SQLite
/// `:memory:` connection is its own database.
pub async fn connect_in_memory() -> Result<SqlitePool, StartupError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}
