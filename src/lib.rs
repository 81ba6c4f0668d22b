//! Duochat - Main Library
//!
//! Duochat is a two-party direct messaging server: users register, find and
//! befriend each other, and exchange text messages that are persisted first and
//! then pushed to every live connection of both participants.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared by the server and any client
//!   - Wire envelope for the live channel (`ClientEvent` / `ServerEvent`)
//!   - Messaging DTOs, participant pair normalisation
//!   - Configuration model and shared error type
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP server and WebSocket endpoint
//!   - Connection registry, session state machine, message dispatcher
//!   - Authentication, friends, profiles, conversation and message REST API
//!   - SQLite persistence through sqlx
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - enables the `backend` module and the server binary
//!
//! # Usage
//!
//! ```rust,no_run
//! use duochat::backend::server::init::create_app;
//! use duochat::shared::AppConfig;
//!
//! # async fn example(config: AppConfig) {
//! let app = create_app(config).await.expect("startup failed");
//! // Serve `app.router` with axum
//! # }
//! ```
//!
//! # Thread Safety
//!
//! - The connection registry is an `Arc<RwLock<..>>` shared by every connection task
//! - Per-conversation dispatch is serialised with async mutexes
//! - Each live connection owns a single writer task fed by an unbounded channel

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
