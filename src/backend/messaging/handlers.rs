//! Messaging HTTP Handlers
//!
//! Conversations, message history, sending over REST, read receipts and the
//! unread poll. All routes sit behind `auth_middleware`.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};
use sqlx::SqlitePool;

use super::db;
use crate::backend::auth::users::get_user_by_id;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::realtime::Dispatcher;
use crate::shared::event::parse_identity;
use crate::shared::messaging::{
    ChatMessage, ConversationSummary, DeliveredMessage, MarkReadRequest, MarkReadResponse,
    MessagesQuery, ParticipantPair, SendMessageRequest, SendRequest, StartConversationRequest,
};

/// Maximum ids accepted by one mark-read call
pub const MAX_MARK_READ_BATCH: usize = 500;

/// List the caller's conversations, most recently active first
pub async fn get_conversations(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<ConversationSummary>>, BackendError> {
    let conversations = db::get_conversations_for_user(&pool, user.user_id).await?;
    Ok(Json(conversations))
}

/// Start the conversation with another user, or return the existing one
///
/// Responds 201 when the conversation was created by this call, 200 otherwise.
pub async fn start_conversation(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    body: Result<Json<StartConversationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ConversationSummary>), BackendError> {
    let Json(request) = body?;
    let participant_id = parse_identity("participantId", request.participant_id.as_deref())?;

    let pair = ParticipantPair::new(user.user_id, participant_id)
        .ok_or_else(|| BackendError::conflict("Cannot start a conversation with yourself"))?;
    if get_user_by_id(&pool, participant_id).await?.is_none() {
        return Err(BackendError::not_found("User not found"));
    }

    let (conversation, created) = db::find_or_create_conversation(&pool, pair).await?;
    let summary = db::get_conversation_summary(&pool, conversation.id, user.user_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Conversation not found"))?;

    if created {
        tracing::info!(
            conversation_id = %conversation.id,
            "[Messaging] Conversation started by {} with {}",
            user.user_id,
            participant_id
        );
        Ok((StatusCode::CREATED, Json(summary)))
    } else {
        Ok((StatusCode::OK, Json(summary)))
    }
}

/// History with one friend, oldest first
///
/// An empty list when the two users have never talked.
pub async fn get_messages(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    query: Result<Query<MessagesQuery>, QueryRejection>,
) -> Result<Json<Vec<ChatMessage>>, BackendError> {
    let Query(params) = query?;
    let friend_id = parse_identity("friendId", params.friend_id.as_deref())?;

    let Some(pair) = ParticipantPair::new(user.user_id, friend_id) else {
        return Ok(Json(Vec::new()));
    };
    let messages = match db::get_conversation_for_pair(&pool, pair).await? {
        Some(conversation) => db::get_messages_for_conversation(&pool, conversation.id).await?,
        None => Vec::new(),
    };
    Ok(Json(messages))
}

/// Send a message over REST; live connections are notified like a socket send
pub async fn send_message(
    State(dispatcher): State<Dispatcher>,
    AuthUser(user): AuthUser,
    body: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DeliveredMessage>), BackendError> {
    let Json(request) = body?;
    let friend_id = parse_identity("friendId", request.friend_id.as_deref())?;
    let content = request.message.unwrap_or_default();

    let outcome = dispatcher
        .dispatch(SendRequest::new(user.user_id, friend_id, content))
        .await?;
    Ok((StatusCode::CREATED, Json(outcome.message)))
}

/// Mark a batch of messages addressed to the caller as read
///
/// Ids the caller may not mark (own messages, other people's conversations,
/// unknown ids) are ignored.
pub async fn mark_messages_read(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    body: Result<Json<MarkReadRequest>, JsonRejection>,
) -> Result<Json<MarkReadResponse>, BackendError> {
    let Json(request) = body?;
    if request.message_ids.is_empty() {
        return Err(BackendError::validation("messageIds must be a non-empty array"));
    }
    if request.message_ids.len() > MAX_MARK_READ_BATCH {
        return Err(BackendError::validation(format!(
            "At most {} messageIds per request",
            MAX_MARK_READ_BATCH
        )));
    }

    let updated = db::mark_messages_read(&pool, user.user_id, &request.message_ids).await?;
    tracing::debug!("[Messaging] {} marked {} messages read", user.user_id, updated);

    Ok(Json(MarkReadResponse {
        success: true,
        updated,
    }))
}

/// Unread messages addressed to the caller, newest first
pub async fn get_unread_messages(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<DeliveredMessage>>, BackendError> {
    let messages = db::get_unread_messages_for_user(&pool, user.user_id).await?;
    Ok(Json(messages))
}
