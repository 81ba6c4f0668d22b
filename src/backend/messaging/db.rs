//! Database operations for messaging
//!
//! This module contains database operations for friends, conversations and
//! messages. Conversations are keyed by a normalised `ParticipantPair`, so
//! resolving one is idempotent under concurrency.

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::backend::auth::users::User;
use crate::shared::messaging::{
    ChatMessage, ConversationSummary, DeliveredMessage, Participant, ParticipantPair, SenderProfile,
};

/// A conversation row
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ConversationRecord {
    pub id: Uuid,
    pub user_low: Uuid,
    pub user_high: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationRecord {
    pub fn pair(&self) -> Option<ParticipantPair> {
        ParticipantPair::new(self.user_low, self.user_high)
    }
}

// ---------------------------------------------------------------------------
// Friends
// ---------------------------------------------------------------------------

/// Add `friend_id` to `user_id`'s friend list
///
/// Returns `false` when the friendship already existed.
pub async fn add_friend(pool: &SqlitePool, user_id: Uuid, friend_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO friendships (user_id, friend_id, created_at)
        VALUES (?, ?, ?)
        ON CONFLICT (user_id, friend_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(friend_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Get a user's friends, oldest friendship first
pub async fn get_friends_for_user(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT u.id, u.name, u.email, u.password_hash, u.avatar, u.description, u.created_at, u.updated_at
        FROM friendships f
        JOIN users u ON u.id = f.friend_id
        WHERE f.user_id = ?
        ORDER BY f.created_at ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

// ---------------------------------------------------------------------------
// Conversations
// ---------------------------------------------------------------------------

/// Resolve the conversation for a pair, creating it on first contact
///
/// Returns the conversation and whether this call created it. Concurrent
/// callers for the same pair all observe the same row.
pub async fn find_or_create_conversation(
    pool: &SqlitePool,
    pair: ParticipantPair,
) -> Result<(ConversationRecord, bool), sqlx::Error> {
    let now = Utc::now();
    let inserted = sqlx::query(
        r#"
        INSERT INTO conversations (id, user_low, user_high, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT (user_low, user_high) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(pair.low())
    .bind(pair.high())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?
    .rows_affected()
        == 1;

    let conversation = sqlx::query_as::<_, ConversationRecord>(
        r#"
        SELECT id, user_low, user_high, created_at, updated_at
        FROM conversations
        WHERE user_low = ? AND user_high = ?
        "#,
    )
    .bind(pair.low())
    .bind(pair.high())
    .fetch_one(pool)
    .await?;

    Ok((conversation, inserted))
}

/// Look up the conversation for a pair without creating it
pub async fn get_conversation_for_pair(
    pool: &SqlitePool,
    pair: ParticipantPair,
) -> Result<Option<ConversationRecord>, sqlx::Error> {
    sqlx::query_as::<_, ConversationRecord>(
        r#"
        SELECT id, user_low, user_high, created_at, updated_at
        FROM conversations
        WHERE user_low = ? AND user_high = ?
        "#,
    )
    .bind(pair.low())
    .bind(pair.high())
    .fetch_optional(pool)
    .await
}

const SUMMARY_SELECT: &str = r#"
    SELECT c.id, c.created_at, c.updated_at,
           lo.id AS low_id, lo.name AS low_name, lo.email AS low_email,
           hi.id AS high_id, hi.name AS high_name, hi.email AS high_email,
           (SELECT COUNT(*) FROM messages m
             WHERE m.conversation_id = c.id AND m.is_read = 0 AND m.sender_id <> ?) AS unread_count
    FROM conversations c
    JOIN users lo ON lo.id = c.user_low
    JOIN users hi ON hi.id = c.user_high
"#;

fn summary_from_row(row: &SqliteRow) -> ConversationSummary {
    let unread: i64 = row.get("unread_count");
    ConversationSummary {
        id: row.get("id"),
        participants: vec![
            Participant {
                id: row.get("low_id"),
                name: row.get("low_name"),
                email: row.get("low_email"),
            },
            Participant {
                id: row.get("high_id"),
                name: row.get("high_name"),
                email: row.get("high_email"),
            },
        ],
        unread_count: u32::try_from(unread).unwrap_or(u32::MAX),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Get all conversations for a user, most recently active first
pub async fn get_conversations_for_user(
    pool: &SqlitePool,
    user_id: Uuid,
) -> Result<Vec<ConversationSummary>, sqlx::Error> {
    let query = format!(
        "{} WHERE c.user_low = ? OR c.user_high = ? ORDER BY c.updated_at DESC, c.id",
        SUMMARY_SELECT
    );
    let rows = sqlx::query(&query)
        .bind(user_id)
        .bind(user_id)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(summary_from_row).collect())
}

/// Get one conversation as seen by `viewer`
pub async fn get_conversation_summary(
    pool: &SqlitePool,
    conversation_id: Uuid,
    viewer: Uuid,
) -> Result<Option<ConversationSummary>, sqlx::Error> {
    let query = format!("{} WHERE c.id = ?", SUMMARY_SELECT);
    let row = sqlx::query(&query)
        .bind(viewer)
        .bind(conversation_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(summary_from_row))
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Store a message with `read = false` and bump the conversation
///
/// The timestamp never goes below the previous message in the same
/// conversation, so history stays non-decreasing if the clock steps back.
///
/// The transaction takes the write lock up front. A deferred one would read
/// first and then fail with `SQLITE_BUSY` when upgrading to a write while
/// another connection is storing into a different conversation.
pub async fn store_message(
    pool: &SqlitePool,
    conversation_id: Uuid,
    sender_id: Uuid,
    content: &str,
) -> Result<ChatMessage, sqlx::Error> {
    let mut tx = pool.begin_with("BEGIN IMMEDIATE").await?;

    let last: Option<DateTime<Utc>> = sqlx::query_scalar(
        "SELECT created_at FROM messages WHERE conversation_id = ? ORDER BY seq DESC LIMIT 1",
    )
    .bind(conversation_id)
    .fetch_optional(&mut *tx)
    .await?;
    let now = Utc::now();
    let created_at = match last {
        Some(last) if last > now => last,
        _ => now,
    };

    let message = sqlx::query_as::<_, ChatMessage>(
        r#"
        INSERT INTO messages (id, conversation_id, sender_id, content, is_read, created_at)
        VALUES (?, ?, ?, ?, 0, ?)
        RETURNING id, conversation_id, sender_id, content, is_read, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(conversation_id)
    .bind(sender_id)
    .bind(content)
    .bind(created_at)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE conversations SET updated_at = ? WHERE id = ?")
        .bind(created_at)
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(message)
}

/// Get messages for a conversation in creation order
pub async fn get_messages_for_conversation(
    pool: &SqlitePool,
    conversation_id: Uuid,
) -> Result<Vec<ChatMessage>, sqlx::Error> {
    sqlx::query_as::<_, ChatMessage>(
        r#"
        SELECT id, conversation_id, sender_id, content, is_read, created_at
        FROM messages
        WHERE conversation_id = ?
        ORDER BY seq ASC
        "#,
    )
    .bind(conversation_id)
    .fetch_all(pool)
    .await
}

/// Unread messages addressed to `user_id`, newest first, with sender profile
pub async fn get_unread_messages_for_user(
    pool: &SqlitePool,
    user_id: Uuid,
) -> Result<Vec<DeliveredMessage>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT m.id, m.conversation_id, m.content, m.is_read, m.created_at,
               u.id AS sender_id, u.name AS sender_name, u.email AS sender_email, u.avatar AS sender_avatar
        FROM messages m
        JOIN conversations c ON c.id = m.conversation_id
        JOIN users u ON u.id = m.sender_id
        WHERE (c.user_low = ? OR c.user_high = ?)
          AND m.sender_id <> ?
          AND m.is_read = 0
        ORDER BY m.seq DESC
        "#,
    )
    .bind(user_id)
    .bind(user_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| DeliveredMessage {
            id: row.get("id"),
            conversation_id: row.get("conversation_id"),
            sender: SenderProfile {
                id: row.get("sender_id"),
                name: row.get("sender_name"),
                email: row.get("sender_email"),
                avatar: row.get("sender_avatar"),
            },
            content: row.get("content"),
            created_at: row.get("created_at"),
            read: row.get("is_read"),
        })
        .collect())
}

/// Mark messages read on behalf of `user_id`
///
/// Only messages in one of the user's conversations that the user did not
/// send are touched; other ids are ignored. Returns the number flipped.
pub async fn mark_messages_read(
    pool: &SqlitePool,
    user_id: Uuid,
    message_ids: &[Uuid],
) -> Result<u64, sqlx::Error> {
    if message_ids.is_empty() {
        return Ok(0);
    }

    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("UPDATE messages SET is_read = 1 WHERE is_read = 0 AND id IN (");
    let mut ids = builder.separated(", ");
    for id in message_ids {
        ids.push_bind(*id);
    }
    ids.push_unseparated(") AND sender_id <> ");
    builder.push_bind(user_id);
    builder.push(" AND conversation_id IN (SELECT id FROM conversations WHERE user_low = ");
    builder.push_bind(user_id);
    builder.push(" OR user_high = ");
    builder.push_bind(user_id);
    builder.push(")");

    let result = builder.build().execute(pool).await?;
    Ok(result.rows_affected())
}
