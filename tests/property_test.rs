//! Property-based tests
//!
//! Uses proptest to generate random inputs and verify properties of the
//! participant pair, the inbound frame parser and the connection registry.

use proptest::prelude::*;
use std::collections::HashMap;
use uuid::Uuid;

use duochat::backend::realtime::{ConnectionHandle, ConnectionRegistry};
use duochat::shared::event::parse_identity;
use duochat::shared::messaging::ParticipantPair;
use duochat::shared::ClientEvent;

fn uuid_strategy() -> impl Strategy<Value = Uuid> {
    any::<u128>().prop_map(Uuid::from_u128)
}

#[derive(Debug, Clone)]
enum Op {
    Register { connection: usize, user: usize },
    Unregister { connection: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..4usize, 0..3usize).prop_map(|(connection, user)| Op::Register { connection, user }),
        (0..4usize).prop_map(|connection| Op::Unregister { connection }),
    ]
}

proptest! {
    #[test]
    fn test_pair_is_order_independent(a in uuid_strategy(), b in uuid_strategy()) {
        prop_assert_eq!(ParticipantPair::new(a, b), ParticipantPair::new(b, a));

        match ParticipantPair::new(a, b) {
            Some(pair) => {
                prop_assert!(pair.low() < pair.high());
                prop_assert!(pair.contains(a) && pair.contains(b));
                prop_assert_eq!(pair.other(a), Some(b));
            }
            None => prop_assert_eq!(a, b),
        }
    }

    #[test]
    fn test_parse_never_panics(text in ".*") {
        let _ = ClientEvent::parse(&text);
    }

    #[test]
    fn test_parse_identity_accepts_exactly_non_nil_uuids(text in ".*") {
        match parse_identity("userId", Some(&text)) {
            Ok(id) => {
                prop_assert!(!id.is_nil());
                prop_assert_eq!(Uuid::parse_str(text.trim()).ok(), Some(id));
            }
            Err(err) => prop_assert!(err.is_validation()),
        }
    }

    #[test]
    fn test_message_frames_with_valid_recipient_parse(
        recipient in uuid_strategy(),
        content in "[^\u{0}]{0,64}",
    ) {
        let frame = serde_json::json!({
            "type": "message",
            "recipientId": recipient,
            "content": content,
        });
        let parsed = ClientEvent::parse(&frame.to_string());
        prop_assert!(parsed.is_ok());
    }

    #[test]
    fn test_registry_matches_model(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let registry = ConnectionRegistry::new();
        let connections: Vec<_> = (0..4).map(|_| ConnectionHandle::channel()).collect();
        let users: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let mut model: HashMap<usize, usize> = HashMap::new();

        for op in ops {
            match op {
                Op::Register { connection, user } => {
                    let changed = registry
                        .register(&connections[connection].0, users[user])
                        .unwrap();
                    let previous = model.insert(connection, user);
                    prop_assert_eq!(changed, previous != Some(user));
                }
                Op::Unregister { connection } => {
                    let removed = registry.unregister(connections[connection].0.id());
                    let expected = model.remove(&connection).map(|user| users[user]);
                    prop_assert_eq!(removed, expected);
                }
            }

            prop_assert_eq!(registry.connection_count(), model.len());
            for (index, user) in users.iter().enumerate() {
                let expected = model.values().filter(|u| **u == index).count();
                prop_assert_eq!(registry.lookup(*user).len(), expected);
                prop_assert_eq!(registry.is_online(*user), expected > 0);
            }
        }
    }
}
