//! Backend Module
//!
//! All server-side code for duochat: the Axum HTTP server, the WebSocket
//! live channel, authentication and SQLite persistence.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`realtime`** - Connection registry, sessions, dispatcher, socket actor
//! - **`messaging`** - Friends, conversations and messages (SQL + handlers)
//! - **`auth`** - Registration, login, tokens, passwords, profiles
//! - **`middleware`** - Bearer token authentication
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── realtime/       - Live delivery
//! ├── messaging/      - Conversations, messages, friends
//! ├── auth/           - Authentication
//! ├── middleware/     - Request middleware
//! └── error/          - Error types
//! ```
//!
//! # Message Flow
//!
//! A message sent over `/ws` or `POST /api/messages` goes through the same
//! `Dispatcher`: it is validated, stored under the conversation's lock and
//! then queued on every live connection of both participants.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Real-time delivery
pub mod realtime;

/// Backend error types
pub mod error;

/// Authentication and user management
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// Messaging and friend system
pub mod messaging;

pub use error::BackendError;
pub use server::{create_app, App, AppState};
