/**
 * Application State Management
 *
 * `AppState` is the central state container handed to the router. It holds
 * the database pool, the token service, the connection registry, the
 * dispatcher and the loaded configuration.
 *
 * # State Extraction
 *
 * The `FromRef` implementations let handlers extract only the part they
 * need, e.g. `State(pool): State<SqlitePool>`.
 *
 * # Thread Safety
 *
 * Every field is cheap to clone and shares its inner state: the pool and
 * registry are reference counted, and the dispatcher shares its locks.
 */

use axum::extract::FromRef;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::backend::auth::TokenService;
use crate::backend::realtime::{ConnectionRegistry, Dispatcher};
use crate::shared::config::AppConfig;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool
    pub db_pool: SqlitePool,

    /// Issues and verifies bearer tokens
    pub tokens: TokenService,

    /// Live WebSocket connections by user
    ///
    /// The dispatcher holds a clone of the same registry.
    pub registry: ConnectionRegistry,

    /// Persist-then-deliver pipeline used by both the socket and REST sends
    pub dispatcher: Dispatcher,

    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire the services together around an open pool
    pub fn new(config: AppConfig, db_pool: SqlitePool) -> Self {
        let tokens = TokenService::new(&config.jwt_secret, config.token_ttl_secs);
        let registry = ConnectionRegistry::new();
        let dispatcher = Dispatcher::new(db_pool.clone(), registry.clone(), config.max_message_length);

        Self {
            db_pool,
            tokens,
            registry,
            dispatcher,
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}

impl FromRef<AppState> for TokenService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.tokens.clone()
    }
}

impl FromRef<AppState> for ConnectionRegistry {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.registry.clone()
    }
}

impl FromRef<AppState> for Dispatcher {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.dispatcher.clone()
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}
