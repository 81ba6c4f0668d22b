//! Chat Message Data Structures
//!
//! `ChatMessage` is the stored form returned by history queries.
//! `DeliveredMessage` is the enriched form pushed over the live channel and
//! returned by the unread poll.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Represents a stored chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Unique message ID
    pub id: Uuid,
    /// Conversation this message belongs to
    pub conversation_id: Uuid,
    /// User who sent the message
    pub sender_id: Uuid,
    pub content: String,
    /// Whether the recipient has marked the message read
    #[sqlx(rename = "is_read")]
    pub read: bool,
    /// Server-assigned creation time
    pub created_at: DateTime<Utc>,
}

/// Display attributes of a message sender
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SenderProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

/// A message enriched with its sender's profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeliveredMessage {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender: SenderProfile,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

impl DeliveredMessage {
    pub fn new(message: &ChatMessage, sender: SenderProfile) -> Self {
        Self {
            id: message.id,
            conversation_id: message.conversation_id,
            sender,
            content: message.content.clone(),
            created_at: message.created_at,
            read: message.read,
        }
    }
}

/// A validated request to send one message, shared by the live channel and
/// the REST endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
}

impl SendRequest {
    pub fn new(sender_id: Uuid, recipient_id: Uuid, content: impl Into<String>) -> Self {
        Self {
            sender_id,
            recipient_id,
            content: content.into(),
        }
    }

    /// Check that both identities are set and the content is non-blank and
    /// at most `max_len` characters.
    ///
    /// # Errors
    ///
    /// Returns `SharedError::ValidationError` naming the offending field.
    pub fn validate(&self, max_len: usize) -> Result<(), SharedError> {
        if self.sender_id.is_nil() {
            return Err(SharedError::validation("userId", "Sender is required"));
        }
        if self.recipient_id.is_nil() {
            return Err(SharedError::validation("recipientId", "Recipient is required"));
        }
        if self.content.trim().is_empty() {
            return Err(SharedError::validation("content", "Message content cannot be empty"));
        }
        let len = self.content.chars().count();
        if len > max_len {
            return Err(SharedError::validation(
                "content",
                format!("Message content is {} characters, the limit is {}", len, max_len),
            ));
        }
        Ok(())
    }
}

/// REST body for `POST /api/messages`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub friend_id: Option<String>,
    pub message: Option<String>,
}

/// Query for `GET /api/messages`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesQuery {
    pub friend_id: Option<String>,
}

/// REST body for `PATCH /api/messages/read`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    #[serde(default)]
    pub message_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkReadResponse {
    pub success: bool,
    /// Number of messages that flipped to read
    pub updated: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_request_validation() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert!(SendRequest::new(a, b, "hello").validate(10).is_ok());
        assert!(SendRequest::new(a, b, "").validate(10).is_err());
        assert!(SendRequest::new(a, b, "   \n").validate(10).is_err());
        assert!(SendRequest::new(Uuid::nil(), b, "hi").validate(10).is_err());
        assert!(SendRequest::new(a, Uuid::nil(), "hi").validate(10).is_err());
    }

    #[test]
    fn test_send_request_length_counts_characters() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert!(SendRequest::new(a, b, "ééé").validate(3).is_ok());
        let err = SendRequest::new(a, b, "éééé").validate(3).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_mark_read_request_defaults_to_empty() {
        let request: MarkReadRequest = serde_json::from_str("{}").unwrap();
        assert!(request.message_ids.is_empty());
    }
}
