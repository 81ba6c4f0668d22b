//! Application configuration module
//!
//! `AppConfig` is assembled through `AppConfigBuilder` from three layers:
//! built-in defaults, an optional TOML file, then environment variables.
//! The server loader in `backend::server::config` applies the last two.
//!
//! ```toml
//! database_url = "sqlite://duochat.db"
//! jwt_secret = "change-me"
//! port = 4000
//!
//! [ws]
//! require_join_token = true
//! ping_interval_secs = 30
//! ```

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 4000;
/// One day
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 86_400;
/// bcrypt's own default cost
pub const DEFAULT_PASSWORD_HASH_COST: u32 = 12;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 16;
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 10_000;
pub const DEFAULT_LOCK_CLEANUP_INTERVAL_SECS: u64 = 300;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// sqlx connection string, e.g. `sqlite://duochat.db`
    pub database_url: String,
    /// HMAC secret for session tokens
    pub jwt_secret: String,
    pub server_addr: String,
    pub server_port: u16,
    pub token_ttl_secs: u64,
    pub password_hash_cost: u32,
    pub db_max_connections: u32,
    pub max_message_length: usize,
    pub lock_cleanup_interval_secs: u64,
    pub ws: WsConfig,
}

/// Live channel settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WsConfig {
    /// Reject joins that do not carry a valid token for the claimed identity
    pub require_join_token: bool,
    pub ping_interval_secs: u64,
    /// Close a connection after this long without any inbound frame
    pub idle_timeout_secs: u64,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            require_join_token: true,
            ping_interval_secs: 30,
            idle_timeout_secs: 75,
        }
    }
}

impl WsConfig {
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::MissingValue("DATABASE_URL"));
        }
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingValue("JWT_SECRET"));
        }
        if self.token_ttl_secs == 0 {
            return Err(ConfigError::invalid("TOKEN_TTL_SECS", "must be greater than zero"));
        }
        if !(4..=31).contains(&self.password_hash_cost) {
            return Err(ConfigError::invalid("PASSWORD_HASH_COST", "must be between 4 and 31"));
        }
        if self.db_max_connections == 0 {
            return Err(ConfigError::invalid("DB_MAX_CONNECTIONS", "must be greater than zero"));
        }
        if self.max_message_length == 0 {
            return Err(ConfigError::invalid("MAX_MESSAGE_LENGTH", "must be greater than zero"));
        }
        if self.lock_cleanup_interval_secs == 0 {
            return Err(ConfigError::invalid(
                "LOCK_CLEANUP_INTERVAL_SECS",
                "must be greater than zero",
            ));
        }
        if self.ws.ping_interval_secs == 0 || self.ws.idle_timeout_secs <= self.ws.ping_interval_secs {
            return Err(ConfigError::invalid(
                "WS_IDLE_TIMEOUT_SECS",
                "must be longer than a non-zero ping interval",
            ));
        }
        Ok(())
    }

    /// `addr:port` for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_addr, self.server_port)
    }

    pub fn lock_cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.lock_cleanup_interval_secs)
    }
}

/// Shape of the optional TOML file; every key may be omitted
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub database_url: Option<String>,
    pub jwt_secret: Option<String>,
    pub address: Option<String>,
    pub port: Option<u16>,
    pub token_ttl_secs: Option<u64>,
    pub password_hash_cost: Option<u32>,
    pub db_max_connections: Option<u32>,
    pub max_message_length: Option<usize>,
    pub lock_cleanup_interval_secs: Option<u64>,
    pub ws: Option<WsConfig>,
}

/// Builder for AppConfig
#[derive(Debug, Default, Clone)]
pub struct AppConfigBuilder {
    database_url: Option<String>,
    jwt_secret: Option<String>,
    server_addr: Option<String>,
    server_port: Option<u16>,
    token_ttl_secs: Option<u64>,
    password_hash_cost: Option<u32>,
    db_max_connections: Option<u32>,
    max_message_length: Option<usize>,
    lock_cleanup_interval_secs: Option<u64>,
    ws: Option<WsConfig>,
}

impl AppConfigBuilder {
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = Some(secret.into());
        self
    }

    pub fn server_addr(mut self, addr: impl Into<String>) -> Self {
        self.server_addr = Some(addr.into());
        self
    }

    pub fn server_port(mut self, port: u16) -> Self {
        self.server_port = Some(port);
        self
    }

    pub fn token_ttl_secs(mut self, secs: u64) -> Self {
        self.token_ttl_secs = Some(secs);
        self
    }

    pub fn password_hash_cost(mut self, cost: u32) -> Self {
        self.password_hash_cost = Some(cost);
        self
    }

    pub fn db_max_connections(mut self, max: u32) -> Self {
        self.db_max_connections = Some(max);
        self
    }

    pub fn max_message_length(mut self, len: usize) -> Self {
        self.max_message_length = Some(len);
        self
    }

    pub fn lock_cleanup_interval_secs(mut self, secs: u64) -> Self {
        self.lock_cleanup_interval_secs = Some(secs);
        self
    }

    pub fn ws(mut self, ws: WsConfig) -> Self {
        self.ws = Some(ws);
        self
    }

    /// Live channel settings as currently layered
    pub fn ws_config(&self) -> WsConfig {
        self.ws.clone().unwrap_or_default()
    }

    pub fn require_join_token(mut self, required: bool) -> Self {
        self.ws.get_or_insert_with(WsConfig::default).require_join_token = required;
        self
    }

    /// Layer the values of a TOML document over what is already set
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML or mistyped keys.
    pub fn merge_toml(self, source: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(source)?;
        Ok(self.merge_file(file))
    }

    pub fn merge_file(mut self, file: FileConfig) -> Self {
        self.database_url = file.database_url.or(self.database_url);
        self.jwt_secret = file.jwt_secret.or(self.jwt_secret);
        self.server_addr = file.address.or(self.server_addr);
        self.server_port = file.port.or(self.server_port);
        self.token_ttl_secs = file.token_ttl_secs.or(self.token_ttl_secs);
        self.password_hash_cost = file.password_hash_cost.or(self.password_hash_cost);
        self.db_max_connections = file.db_max_connections.or(self.db_max_connections);
        self.max_message_length = file.max_message_length.or(self.max_message_length);
        self.lock_cleanup_interval_secs = file
            .lock_cleanup_interval_secs
            .or(self.lock_cleanup_interval_secs);
        self.ws = file.ws.or(self.ws);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let config = AppConfig {
            database_url: self.database_url.ok_or(ConfigError::MissingValue("DATABASE_URL"))?,
            jwt_secret: self.jwt_secret.ok_or(ConfigError::MissingValue("JWT_SECRET"))?,
            server_addr: self.server_addr.unwrap_or_else(|| DEFAULT_ADDR.to_string()),
            server_port: self.server_port.unwrap_or(DEFAULT_PORT),
            token_ttl_secs: self.token_ttl_secs.unwrap_or(DEFAULT_TOKEN_TTL_SECS),
            password_hash_cost: self.password_hash_cost.unwrap_or(DEFAULT_PASSWORD_HASH_COST),
            db_max_connections: self.db_max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),
            max_message_length: self.max_message_length.unwrap_or(DEFAULT_MAX_MESSAGE_LENGTH),
            lock_cleanup_interval_secs: self
                .lock_cleanup_interval_secs
                .unwrap_or(DEFAULT_LOCK_CLEANUP_INTERVAL_SECS),
            ws: self.ws.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    pub fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            message: message.into(),
        }
    }
}
