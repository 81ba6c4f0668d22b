/**
 * Server Initialization
 *
 * Builds the application from a loaded configuration:
 *
 * 1. Open the database and run migrations
 * 2. Create `AppState` (tokens, registry, dispatcher)
 * 3. Start the periodic lock cleanup task
 * 4. Create the router
 */

use axum::Router;
use sqlx::SqlitePool;
use std::time::Duration;

use crate::backend::realtime::ConversationLocks;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, StartupError};
use crate::backend::server::state::AppState;
use crate::shared::config::AppConfig;

/// A configured application: the router plus the state behind it
pub struct App {
    pub router: Router<()>,
    pub state: AppState,
}

/// Create and configure the application
///
/// # Errors
///
/// Fails when the database cannot be opened or migrated.
pub async fn create_app(config: AppConfig) -> Result<App, StartupError> {
    tracing::info!("[Server] Initializing duochat backend");

    let pool = load_database(&config).await?;
    let app = build_app(config, pool);

    let interval = app.state.config.lock_cleanup_interval();
    spawn_lock_cleanup(app.state.dispatcher.locks().clone(), interval);
    tracing::info!("[Server] Router configured with periodic lock cleanup");

    Ok(app)
}

/// Assemble state and router around an already-open pool
///
/// Does not spawn background tasks; tests use this directly.
pub fn build_app(config: AppConfig, pool: SqlitePool) -> App {
    let state = AppState::new(config, pool);
    let router = create_router(state.clone());
    App { router, state }
}

/// Periodically drop conversation locks that nobody holds
pub fn spawn_lock_cleanup(locks: ConversationLocks, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = locks.cleanup_idle();
            if removed > 0 {
                tracing::debug!("[Server] Dropped {} idle conversation locks", removed);
            }
        }
    })
}
