//! Server Module
//!
//! Initialization and configuration of the Axum HTTP server.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Config loading, database pool, StartupError
//! └── init.rs         - App creation and background tasks
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: defaults, optional TOML file, environment
//! 2. **Database**: open the SQLite pool and run migrations
//! 3. **State Creation**: token service, connection registry, dispatcher
//! 4. **Background Tasks**: idle conversation lock cleanup
//! 5. **Router Creation**: REST routes, `/ws`, `/health`, fallback
//!
//! # Example
//!
//! ```rust,no_run
//! use duochat::backend::server::{config::load_config, create_app};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config()?;
//! let app = create_app(config).await?;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use config::StartupError;
pub use init::{build_app, create_app, App};
pub use state::AppState;
