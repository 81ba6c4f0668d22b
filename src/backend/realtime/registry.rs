/**
 * Connection Registry
 *
 * Process-local map from user identity to the set of live connections bound
 * to it. A user may hold several connections at once (several tabs or
 * devices); each connection belongs to at most one user.
 *
 * Nothing here survives a restart. Clients re-join after reconnecting.
 */

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::shared::{ServerEvent, SharedError};

/// Outbound queue of one connection, drained by its writer task
pub type ConnectionSender = mpsc::UnboundedSender<ServerEvent>;

/// Process-unique connection identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A live connection as seen by the registry
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: ConnectionSender,
}

impl ConnectionHandle {
    pub fn new(sender: ConnectionSender) -> Self {
        Self {
            id: ConnectionId::next(),
            sender,
        }
    }

    /// A handle plus the receiving end of its queue
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue an event; `false` once the writer side has gone away
    pub fn send(&self, event: ServerEvent) -> bool {
        self.sender.send(event).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

#[derive(Default)]
struct RegistryInner {
    by_user: HashMap<Uuid, HashMap<ConnectionId, ConnectionHandle>>,
    by_connection: HashMap<ConnectionId, Uuid>,
}

/// Thread-safe registry of live connections, cheap to clone
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the maps half-updated,
    // so a poisoned lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, RegistryInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bind a connection to an identity
    ///
    /// Registering the same pair twice is a no-op and returns `false`. A
    /// connection registered under another identity is moved.
    ///
    /// # Errors
    ///
    /// Rejects the nil identity.
    pub fn register(&self, connection: &ConnectionHandle, identity: Uuid) -> Result<bool, SharedError> {
        if identity.is_nil() {
            return Err(SharedError::validation("userId", "Identity must not be empty"));
        }

        let mut inner = self.write();
        match inner.by_connection.insert(connection.id(), identity) {
            Some(previous) if previous == identity => return Ok(false),
            Some(previous) => {
                remove_from_user(&mut inner.by_user, previous, connection.id());
            }
            None => {}
        }
        inner
            .by_user
            .entry(identity)
            .or_default()
            .insert(connection.id(), connection.clone());
        let count = inner.by_user.get(&identity).map_or(0, HashMap::len);
        drop(inner);

        tracing::debug!(
            user_id = %identity,
            connection_id = %connection.id(),
            connections = count,
            "[Realtime] Connection registered"
        );
        Ok(true)
    }

    /// Remove a connection; unknown ids are ignored
    ///
    /// Returns the identity the connection was bound to.
    pub fn unregister(&self, connection_id: ConnectionId) -> Option<Uuid> {
        let mut inner = self.write();
        let identity = inner.by_connection.remove(&connection_id)?;
        remove_from_user(&mut inner.by_user, identity, connection_id);
        drop(inner);

        tracing::debug!(
            user_id = %identity,
            connection_id = %connection_id,
            "[Realtime] Connection unregistered"
        );
        Some(identity)
    }

    /// Every live connection bound to `identity`; empty when offline
    pub fn lookup(&self, identity: Uuid) -> Vec<ConnectionHandle> {
        self.read()
            .by_user
            .get(&identity)
            .map(|connections| connections.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn identity_of(&self, connection_id: ConnectionId) -> Option<Uuid> {
        self.read().by_connection.get(&connection_id).copied()
    }

    pub fn is_online(&self, identity: Uuid) -> bool {
        self.read().by_user.contains_key(&identity)
    }

    pub fn connection_count(&self) -> usize {
        self.read().by_connection.len()
    }

    pub fn user_count(&self) -> usize {
        self.read().by_user.len()
    }
}

fn remove_from_user(
    by_user: &mut HashMap<Uuid, HashMap<ConnectionId, ConnectionHandle>>,
    identity: Uuid,
    connection_id: ConnectionId,
) {
    if let Some(connections) = by_user.get_mut(&identity) {
        connections.remove(&connection_id);
        if connections.is_empty() {
            by_user.remove(&identity);
        }
    }
}
