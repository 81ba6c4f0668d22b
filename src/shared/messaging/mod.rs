//! Messaging Module
//!
//! This module contains the data structures for direct messaging:
//!
//! - `ParticipantPair` - normalised unordered pair of users
//! - `ConversationSummary` - a conversation as listed to one participant
//! - `ChatMessage` - a stored message in history
//! - `DeliveredMessage` - a message as pushed to live connections
//! - `UserSummary` / `ProfileResponse` - public views of a user
//!
//! # Usage
//!
//! ```rust
//! use duochat::shared::messaging::{ChatMessage, ParticipantPair, SendRequest};
//! ```

pub mod conversation;
pub mod message;
pub mod user;

// Re-export all types
pub use conversation::{ConversationSummary, Participant, ParticipantPair, StartConversationRequest};
pub use message::{
    ChatMessage, DeliveredMessage, MarkReadRequest, MarkReadResponse, MessagesQuery,
    SendMessageRequest, SendRequest, SenderProfile,
};
pub use user::{
    AddFriendRequest, ProfileResponse, UpdateProfileRequest, UpdateProfileResponse,
    UserSearchQuery, UserSummary,
};
