/**
 * Message Dispatcher
 *
 * Turns a send request into a stored message and a live push to both
 * participants. Used by the live channel and by `POST /api/messages`.
 *
 * # Dispatch Steps
 *
 * 1. Validate sender, recipient and content; reject self-chat
 * 2. Load both users
 * 3. Under the conversation lock: resolve or create the conversation
 * 4. Persist the message with `read = false`
 * 5. Build the payload with the sender's display attributes
 * 6. Deliver to every recipient connection, then every sender connection
 *
 * A message is durable before any connection sees it, and a delivery
 * failure never rolls it back. The lock keeps persist-then-deliver in order
 * per conversation, so every live connection observes the same order as
 * history.
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use sqlx::SqlitePool;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::broadcast::deliver_to_users;
use super::registry::ConnectionRegistry;
use crate::backend::auth::users::get_user_by_id;
use crate::backend::error::BackendError;
use crate::backend::messaging::db::{find_or_create_conversation, store_message};
use crate::shared::messaging::{DeliveredMessage, ParticipantPair, SendRequest};
use crate::shared::ServerEvent;

/// Per-conversation async locks, created on demand
#[derive(Clone, Default)]
pub struct ConversationLocks {
    locks: Arc<Mutex<HashMap<ParticipantPair, Arc<AsyncMutex<()>>>>>,
}

impl ConversationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a conversation
    pub async fn acquire(&self, pair: ParticipantPair) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(pair).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Drop locks nobody holds or waits on
    ///
    /// Returns how many were removed.
    pub fn cleanup_idle(&self) -> usize {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        let before = locks.len();
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before - locks.len()
    }

    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of a successful dispatch
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub message: DeliveredMessage,
    /// This message opened the conversation
    pub conversation_created: bool,
    /// Live connections the message was queued on
    pub delivered_to: usize,
}

/// Persists and fans out messages
#[derive(Clone)]
pub struct Dispatcher {
    pool: SqlitePool,
    registry: ConnectionRegistry,
    locks: ConversationLocks,
    max_message_length: usize,
}

impl Dispatcher {
    pub fn new(pool: SqlitePool, registry: ConnectionRegistry, max_message_length: usize) -> Self {
        Self {
            pool,
            registry,
            locks: ConversationLocks::new(),
            max_message_length,
        }
    }

    pub fn locks(&self) -> &ConversationLocks {
        &self.locks
    }

    /// Store a message and push it to both participants
    ///
    /// # Errors
    ///
    /// * `ValidationError` - missing identity, blank or oversized content
    /// * `ConflictError` - sender and recipient are the same user
    /// * `NotFoundError` - sender or recipient does not exist
    /// * `PersistenceError` - the conversation or message could not be stored
    pub async fn dispatch(&self, request: SendRequest) -> Result<DispatchOutcome, BackendError> {
        request.validate(self.max_message_length)?;
        let pair = ParticipantPair::new(request.sender_id, request.recipient_id)
            .ok_or_else(|| BackendError::conflict("Cannot start a conversation with yourself"))?;

        let sender = get_user_by_id(&self.pool, request.sender_id)
            .await?
            .ok_or_else(|| BackendError::not_found("Sender not found"))?;
        if get_user_by_id(&self.pool, request.recipient_id).await?.is_none() {
            return Err(BackendError::not_found("Recipient not found"));
        }

        let _guard = self.locks.acquire(pair).await;

        let (conversation, conversation_created) =
            find_or_create_conversation(&self.pool, pair).await.inspect_err(|e| {
                tracing::error!("[Dispatch] Failed to resolve conversation: {}", e);
            })?;
        if conversation_created {
            tracing::info!(
                conversation_id = %conversation.id,
                "[Dispatch] Conversation created between {} and {}",
                pair.low(),
                pair.high()
            );
        }

        let stored = store_message(&self.pool, conversation.id, sender.id, &request.content)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    conversation_id = %conversation.id,
                    "[Dispatch] Failed to store message: {}",
                    e
                );
            })?;

        let message = DeliveredMessage::new(&stored, sender.sender_profile());
        let delivered_to = deliver_to_users(
            &self.registry,
            &[request.recipient_id, request.sender_id],
            &ServerEvent::Message(message.clone()),
        );

        tracing::info!(
            message_id = %message.id,
            conversation_id = %message.conversation_id,
            delivered_to,
            "[Dispatch] Message stored and dispatched"
        );

        Ok(DispatchOutcome {
            message,
            conversation_created,
            delivered_to,
        })
    }
}
