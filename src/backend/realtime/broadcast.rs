/**
 * Event Fan-out
 *
 * Delivers one event to every live connection of a set of users. Offline
 * users and connections whose writer has already stopped are skipped; the
 * socket task of a dead connection unregisters it on its own way out.
 */

use uuid::Uuid;

use super::registry::ConnectionRegistry;
use crate::shared::ServerEvent;

/// Deliver `event` to all connections of `users`
///
/// Duplicate user ids are delivered once.
///
/// # Returns
///
/// Number of connections the event was queued on (0 if nobody is online)
pub fn deliver_to_users(registry: &ConnectionRegistry, users: &[Uuid], event: &ServerEvent) -> usize {
    let mut delivered = 0;
    for (index, user) in users.iter().enumerate() {
        if users[..index].contains(user) {
            continue;
        }
        for connection in registry.lookup(*user) {
            if connection.send(event.clone()) {
                delivered += 1;
            } else {
                tracing::warn!(
                    user_id = %user,
                    connection_id = %connection.id(),
                    "[Realtime] Dropped event for closed connection"
                );
            }
        }
    }

    if delivered == 0 {
        tracing::debug!("[Realtime] No live connections to receive event");
    } else {
        tracing::info!("[Realtime] Event delivered to {} connections", delivered);
    }
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::realtime::registry::ConnectionHandle;
    use crate::shared::ErrorCode;

    fn event() -> ServerEvent {
        ServerEvent::error(ErrorCode::Internal, "ping")
    }

    #[tokio::test]
    async fn test_deliver_to_every_connection() {
        let registry = ConnectionRegistry::new();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let (a1, mut rx_a1) = ConnectionHandle::channel();
        let (a2, mut rx_a2) = ConnectionHandle::channel();
        let (b1, mut rx_b1) = ConnectionHandle::channel();
        registry.register(&a1, alice).unwrap();
        registry.register(&a2, alice).unwrap();
        registry.register(&b1, bob).unwrap();

        assert_eq!(deliver_to_users(&registry, &[bob, alice], &event()), 3);
        assert!(rx_a1.recv().await.is_some());
        assert!(rx_a2.recv().await.is_some());
        assert!(rx_b1.recv().await.is_some());
    }

    #[test]
    fn test_deliver_with_no_connections() {
        let registry = ConnectionRegistry::new();
        assert_eq!(deliver_to_users(&registry, &[Uuid::new_v4()], &event()), 0);
    }

    #[test]
    fn test_duplicate_users_delivered_once() {
        let registry = ConnectionRegistry::new();
        let user = Uuid::new_v4();
        let (conn, mut rx) = ConnectionHandle::channel();
        registry.register(&conn, user).unwrap();

        assert_eq!(deliver_to_users(&registry, &[user, user], &event()), 1);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_connection_is_skipped() {
        let registry = ConnectionRegistry::new();
        let user = Uuid::new_v4();
        let (conn, rx) = ConnectionHandle::channel();
        registry.register(&conn, user).unwrap();
        drop(rx);

        assert_eq!(deliver_to_users(&registry, &[user], &event()), 0);
    }
}
