//! Route Configuration Module
//!
//! Configures all HTTP routes for the backend server, grouped by concern.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation, fallback and layers
//! ├── chat_routes.rs  - WebSocket upgrade and health check
//! └── api_routes.rs   - REST endpoints
//! ```
//!
//! Unknown paths answer with the same JSON error body as every other
//! failure: `{"error": "...", "status": 404}`.

/// Main router creation
pub mod router;

/// Live channel routes
pub mod chat_routes;

/// REST endpoints
pub mod api_routes;

pub use router::create_router;
