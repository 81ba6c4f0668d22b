/**
 * Backend Error Types
 *
 * Every failure a handler, the dispatcher or a live session can hit is one of
 * these variants. The same value is rendered as an HTTP response on the REST
 * surface and as an `error` event on the live channel.
 *
 * # Status Mapping
 *
 * - `ValidationError` - 400
 * - `AuthError` - 401
 * - `NotFoundError` - 404
 * - `ConflictError` - 400 (self-chat, duplicate registration, duplicate friend)
 * - `PersistenceError` - 500, details stay in the server log
 * - `TransportError` - 500, only ever logged by connection tasks
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::{ErrorCode, SharedError};

/// Backend-specific error types
///
/// ```rust
/// use duochat::backend::error::BackendError;
///
/// let err = BackendError::not_found("User not found");
/// assert_eq!(err.status_code().as_u16(), 404);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Missing or malformed input
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    /// Missing, invalid or mismatched credentials
    #[error("Unauthorized: {message}")]
    AuthError { message: String },

    #[error("Not found: {message}")]
    NotFoundError { message: String },

    /// Request conflicts with existing state or with itself
    #[error("Conflict: {message}")]
    ConflictError { message: String },

    /// Storage read or write failure
    #[error("Persistence error: {0}")]
    PersistenceError(#[from] sqlx::Error),

    /// Socket send/receive failure
    #[error("Transport error: {message}")]
    TransportError { message: String },

    /// Hashing, token signing or a panicked blocking task
    #[error("Internal error: {message}")]
    InternalError { message: String },

    /// Undecodable or invalid wire data
    #[error(transparent)]
    SharedError(#[from] SharedError),
}

impl BackendError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::AuthError {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFoundError {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::ConflictError {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::TransportError {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError { .. } => StatusCode::BAD_REQUEST,
            Self::AuthError { .. } => StatusCode::UNAUTHORIZED,
            Self::NotFoundError { .. } => StatusCode::NOT_FOUND,
            Self::ConflictError { .. } => StatusCode::BAD_REQUEST,
            Self::PersistenceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::TransportError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SharedError(err) => match err {
                SharedError::SerializationError { .. } => StatusCode::BAD_REQUEST,
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            },
        }
    }

    /// Code sent with an `error` event on the live channel
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::ValidationError { .. } => ErrorCode::Validation,
            Self::AuthError { .. } => ErrorCode::Unauthorized,
            Self::NotFoundError { .. } => ErrorCode::NotFound,
            Self::ConflictError { .. } => ErrorCode::Conflict,
            Self::SharedError(SharedError::SerializationError { .. }) => ErrorCode::MalformedEvent,
            Self::SharedError(_) => ErrorCode::Validation,
            Self::PersistenceError(_) | Self::TransportError { .. } | Self::InternalError { .. } => {
                ErrorCode::Internal
            }
        }
    }

    /// Whether the details must stay server-side
    pub fn is_internal(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Message safe to show to the client
    pub fn message(&self) -> String {
        match self {
            Self::ValidationError { message }
            | Self::AuthError { message }
            | Self::NotFoundError { message }
            | Self::ConflictError { message } => message.clone(),
            Self::SharedError(err) => match err {
                SharedError::ValidationError { message, .. } => message.clone(),
                other => other.to_string(),
            },
            Self::PersistenceError(_) => "Database operation failed".to_string(),
            Self::TransportError { .. } | Self::InternalError { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}
