//! Backend Error Module
//!
//! This module defines error types specific to the backend server.
//! These errors are used in HTTP handlers, the message dispatcher and live
//! sessions, and can be converted to HTTP responses or `error` events.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions
//! └── conversion.rs - IntoResponse and extractor rejection conversions
//! ```
//!
//! # Error Types
//!
//! - `ValidationError` / `ConflictError` - bad input (400)
//! - `AuthError` - credentials (401)
//! - `NotFoundError` - unknown user or resource (404)
//! - `PersistenceError` - sqlx failures (500, logged)
//! - `TransportError` - socket failures (logged by the connection task)

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

// Re-export commonly used types
pub use types::BackendError;
