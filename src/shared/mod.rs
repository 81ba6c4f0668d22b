//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the server and its clients. These types are used for serialization over the
//! REST API and the live WebSocket channel.
//!
//! # Overview
//!
//! Nothing in here depends on the server stack, so the module compiles
//! without the `ssr` feature.

/// Live channel envelope
pub mod event;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Messaging types for direct chat
pub mod messaging;

/// Re-export commonly used types for convenience
pub use config::{AppConfig, AppConfigBuilder, ConfigError, WsConfig};
pub use error::SharedError;
pub use event::{ClientEvent, ErrorCode, ErrorEvent, ServerEvent};
