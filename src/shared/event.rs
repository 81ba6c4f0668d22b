//! Live Channel Events
//!
//! Every frame on the WebSocket is a JSON object with a `type` discriminator.
//!
//! # Inbound
//!
//! ```json
//! {"type": "join", "userId": "…", "token": "…"}
//! {"type": "message", "userId": "…", "recipientId": "…", "content": "hello"}
//! ```
//!
//! # Outbound
//!
//! ```json
//! {"type": "message", "id": "…", "conversationId": "…", "sender": {…}, "content": "hello", "createdAt": "…", "read": false}
//! {"type": "error", "code": "not_joined", "message": "…"}
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::SharedError;
use super::messaging::DeliveredMessage;

/// Frames a client may send.
///
/// Fields are optional at the serde level so that a frame with a missing
/// field still decodes and is rejected by validation with a precise reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Bind the connection to an identity
    Join {
        user_id: Option<String>,
        token: Option<String>,
    },
    /// Send a message to another user
    Message {
        user_id: Option<String>,
        recipient_id: Option<String>,
        content: Option<String>,
    },
}

impl ClientEvent {
    /// Decode a text frame.
    ///
    /// # Errors
    ///
    /// Returns `SharedError::SerializationError` when the frame is not JSON,
    /// has no `type`, or names an unknown event.
    pub fn parse(text: &str) -> Result<Self, SharedError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Message { .. } => "message",
        }
    }
}

/// Frames the server pushes to a connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    Message(DeliveredMessage),
    Error(ErrorEvent),
}

impl ServerEvent {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error(ErrorEvent {
            code,
            message: message.into(),
        })
    }

    pub fn to_json(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Explicit rejection of an inbound frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub code: ErrorCode,
    pub message: String,
}

/// Machine-readable reason attached to an `error` event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    MalformedEvent,
    NotJoined,
    AlreadyJoined,
    Validation,
    Unauthorized,
    NotFound,
    Conflict,
    Internal,
}

/// Parse a user identity carried as a string in a frame or request body.
///
/// # Errors
///
/// Returns a validation error naming `field` when the value is absent, blank,
/// not a UUID, or the nil UUID.
pub fn parse_identity(field: &str, value: Option<&str>) -> Result<Uuid, SharedError> {
    let raw = value.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(SharedError::validation(field, format!("{} is required", field)));
    }
    let id = Uuid::parse_str(raw)
        .map_err(|_| SharedError::validation(field, format!("{} must be a valid user id", field)))?;
    if id.is_nil() {
        return Err(SharedError::validation(field, format!("{} must be a valid user id", field)));
    }
    Ok(id)
}
