/**
 * Live Session State Machine
 *
 * One `Session` per WebSocket connection:
 *
 * ```text
 * Unjoined --join--> Joined(user) --close--> Closed
 *     |                                        ^
 *     +----------------close-------------------+
 * ```
 *
 * Every inbound frame is handled to completion before the next one, so a
 * dispatch started by this connection finishes even if the peer goes away
 * mid-flight. Rejected frames are answered with an `error` event and the
 * connection stays open.
 */

use thiserror::Error;
use uuid::Uuid;

use super::dispatch::Dispatcher;
use super::registry::{ConnectionHandle, ConnectionRegistry};
use crate::backend::auth::sessions::TokenService;
use crate::backend::error::BackendError;
use crate::shared::event::parse_identity;
use crate::shared::messaging::SendRequest;
use crate::shared::{ClientEvent, ErrorCode, ServerEvent, SharedError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unjoined,
    Joined(Uuid),
    Closed,
}

/// Why an inbound frame was rejected
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("malformed event: {0}")]
    Malformed(SharedError),
    #[error("join before sending messages")]
    NotJoined,
    #[error("connection already joined as {0}")]
    AlreadyJoined(Uuid),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl SessionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Malformed(_) => ErrorCode::MalformedEvent,
            Self::NotJoined => ErrorCode::NotJoined,
            Self::AlreadyJoined(_) => ErrorCode::AlreadyJoined,
            Self::Backend(err) => err.error_code(),
        }
    }

    /// Text sent back to the client
    pub fn client_message(&self) -> String {
        match self {
            Self::Backend(err) => err.message(),
            other => other.to_string(),
        }
    }
}

impl From<SharedError> for SessionError {
    fn from(err: SharedError) -> Self {
        Self::Backend(BackendError::from(err))
    }
}

/// Dependencies a session needs, cloned from application state
#[derive(Clone)]
pub struct SessionContext {
    pub registry: ConnectionRegistry,
    pub dispatcher: Dispatcher,
    pub tokens: TokenService,
    pub require_join_token: bool,
}

pub struct Session {
    connection: ConnectionHandle,
    context: SessionContext,
    state: SessionState,
}

impl Session {
    pub fn new(connection: ConnectionHandle, context: SessionContext) -> Self {
        Self {
            connection,
            context,
            state: SessionState::Unjoined,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn connection(&self) -> &ConnectionHandle {
        &self.connection
    }

    /// Handle one text frame
    ///
    /// Failures are logged and answered with an `error` event; the returned
    /// result only reports what happened.
    pub async fn handle_text(&mut self, text: &str) -> Result<(), SessionError> {
        let result = match ClientEvent::parse(text) {
            Ok(event) => self.handle_event(event).await,
            Err(err) => Err(SessionError::Malformed(err)),
        };

        if let Err(err) = &result {
            tracing::warn!(
                connection_id = %self.connection.id(),
                state = ?self.state,
                "[Realtime] Rejected inbound frame: {}",
                err
            );
            self.connection
                .send(ServerEvent::error(err.code(), err.client_message()));
        }
        result
    }

    pub async fn handle_event(&mut self, event: ClientEvent) -> Result<(), SessionError> {
        match (self.state, event) {
            (SessionState::Closed, event) => {
                tracing::debug!(
                    connection_id = %self.connection.id(),
                    "[Realtime] Ignoring {} event on closed session",
                    event.kind()
                );
                Ok(())
            }
            (_, ClientEvent::Join { user_id, token }) => self.join(user_id.as_deref(), token.as_deref()),
            (SessionState::Unjoined, ClientEvent::Message { .. }) => Err(SessionError::NotJoined),
            (
                SessionState::Joined(me),
                ClientEvent::Message {
                    user_id,
                    recipient_id,
                    content,
                },
            ) => {
                self.send_message(me, user_id.as_deref(), recipient_id.as_deref(), content)
                    .await
            }
        }
    }

    fn join(&mut self, user_id: Option<&str>, token: Option<&str>) -> Result<(), SessionError> {
        let identity = parse_identity("userId", user_id)?;

        if let SessionState::Joined(current) = self.state {
            if current == identity {
                return Ok(());
            }
            return Err(SessionError::AlreadyJoined(current));
        }

        match token {
            Some(token) => {
                let subject = self.context.tokens.user_id_from_token(token)?;
                if subject != identity {
                    return Err(BackendError::auth("Token does not belong to this user").into());
                }
            }
            None if self.context.require_join_token => {
                return Err(BackendError::auth("A token is required to join").into());
            }
            None => {}
        }

        self.context.registry.register(&self.connection, identity)?;
        self.state = SessionState::Joined(identity);
        tracing::info!(
            user_id = %identity,
            connection_id = %self.connection.id(),
            "[Realtime] Connection joined"
        );
        Ok(())
    }

    async fn send_message(
        &mut self,
        me: Uuid,
        claimed_sender: Option<&str>,
        recipient: Option<&str>,
        content: Option<String>,
    ) -> Result<(), SessionError> {
        if let Some(claimed) = claimed_sender.filter(|s| !s.trim().is_empty()) {
            if parse_identity("userId", Some(claimed))? != me {
                return Err(BackendError::auth("Sender does not match the joined identity").into());
            }
        }
        let recipient_id = parse_identity("recipientId", recipient)?;
        let content = content.unwrap_or_default();

        self.context
            .dispatcher
            .dispatch(SendRequest::new(me, recipient_id, content))
            .await?;
        Ok(())
    }

    /// Unregister and stop accepting events; safe to call more than once
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        if let Some(user_id) = self.context.registry.unregister(self.connection.id()) {
            tracing::info!(
                user_id = %user_id,
                connection_id = %self.connection.id(),
                "[Realtime] Connection left"
            );
        }
        self.state = SessionState::Closed;
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}
