//! Shared Error Types
//!
//! Errors raised while decoding or validating data that crosses the wire,
//! independent of the server stack.
//!
//! # Error Categories
//!
//! - `SerializationError` - an inbound frame or body is not the expected JSON
//! - `ValidationError` - a field is missing, empty or out of range
//!
//! # Usage
//!
//! ```rust
//! use duochat::shared::error::SharedError;
//!
//! let error = SharedError::validation("content", "Message content cannot be empty");
//! assert!(error.is_validation());
//! ```
use thiserror::Error;

/// Errors shared by the wire types and their validators
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError { .. })
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::SerializationError { .. })
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
