//! Roster (`allnicks`) announcements.
//!
//! A roster is built and delivered under a single registry lock, so the nicks
//! it lists are exactly the connections it is delivered to.

use std::sync::Arc;

use crate::chat::client::ClientRecord;
use crate::ws::broadcast::{deliver, send_to_connection};
use crate::ws::codec::{self, Frame, ProtocolMessage, Roster};
use crate::ws::ConnectionRegistry;

/// Build a stamped `allnicks` frame for the given members.
pub fn roster_frame(members: &[Arc<ClientRecord>]) -> Frame {
    let allnicks: Vec<String> = members.iter().map(|client| client.nick()).collect();
    tracing::debug!(count = allnicks.len(), nicks = ?allnicks, "Announcing all nicks");
    Frame::stamped(ProtocolMessage::AllNicks(Roster { allnicks }))
}

/// Send the current roster to every registered connection.
/// Called on every connect and disconnect.
pub fn broadcast_roster(registry: &ConnectionRegistry) -> usize {
    registry.with_members(|members| {
        let text = codec::serialize(&roster_frame(members));
        deliver(members, &text)
    })
}

/// Reply to a `getallnicks` request from a single connection.
/// Queued under the registry lock so it cannot land behind a newer roster.
pub fn send_roster(registry: &ConnectionRegistry, record: &ClientRecord) -> bool {
    registry.with_members(|members| send_to_connection(record, &roster_frame(members)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::ws::Message;
    use tokio::sync::mpsc;

    fn roster_of(message: Message) -> Vec<String> {
        let Message::Text(text) = message else {
            panic!("expected a text frame, got {:?}", message);
        };
        match codec::parse(text.as_str()).unwrap().message {
            ProtocolMessage::AllNicks(roster) => roster.allnicks,
            other => panic!("expected allnicks, got {:?}", other),
        }
    }

    #[test]
    fn test_broadcast_roster_reaches_every_member() {
        let registry = ConnectionRegistry::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        let a = Arc::new(ClientRecord::new(tx_a));
        let b = Arc::new(ClientRecord::new(tx_b));
        assert!(b.change_nick("Anonymous", "Bob"));
        registry.register(a);
        registry.register(b);

        assert_eq!(broadcast_roster(&registry), 2);
        assert_eq!(roster_of(rx_a.try_recv().unwrap()), vec!["Anonymous", "Bob"]);
        assert_eq!(roster_of(rx_b.try_recv().unwrap()), vec!["Anonymous", "Bob"]);
    }

    #[test]
    fn test_send_roster_only_reaches_requester() {
        let registry = ConnectionRegistry::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        let a = Arc::new(ClientRecord::new(tx_a));
        registry.register(a.clone());
        registry.register(Arc::new(ClientRecord::new(tx_b)));

        assert!(send_roster(&registry, &a));
        assert_eq!(roster_of(rx_a.try_recv().unwrap()), vec!["Anonymous", "Anonymous"]);
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn test_roster_of_empty_registry() {
        let frame = roster_frame(&[]);
        assert_eq!(
            frame.message,
            ProtocolMessage::AllNicks(Roster { allnicks: vec![] })
        );
        assert!(frame.serverdate.is_some());
    }

    fn drain_rosters(rx: &mut mpsc::UnboundedReceiver<Message>) -> Vec<Vec<String>> {
        let mut rosters = Vec::new();
        while let Ok(message) = rx.try_recv() {
            rosters.push(roster_of(message));
        }
        rosters
    }

    #[test]
    fn test_roster_reply_never_trails_a_newer_announcement() {
        for _ in 0..500 {
            let registry = ConnectionRegistry::new();
            let (tx, mut rx) = mpsc::unbounded_channel();
            let requester = Arc::new(ClientRecord::new(tx));
            registry.register(requester.clone());

            let joiner = {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    let (tx, rx) = mpsc::unbounded_channel();
                    registry.register(Arc::new(ClientRecord::new(tx)));
                    broadcast_roster(&registry);
                    rx
                })
            };
            assert!(send_roster(&registry, &requester));
            let _joiner_rx = joiner.join().unwrap();

            let rosters = drain_rosters(&mut rx);
            assert_eq!(rosters.last().unwrap().len(), registry.len());
        }
    }

    #[test]
    fn test_concurrent_join_and_leave_rosters_list_their_recipients() {
        const THREADS: usize = 8;
        const ROUNDS: usize = 200;

        let registry = ConnectionRegistry::new();
        let workers: Vec<_> = (0..THREADS)
            .map(|i| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    let nick = format!("t{}", i);
                    for _ in 0..ROUNDS {
                        let (tx, mut rx) = mpsc::unbounded_channel();
                        let record = Arc::new(ClientRecord::new(tx));
                        assert!(record.change_nick("Anonymous", &nick));

                        registry.register(record.clone());
                        let delivered = broadcast_roster(&registry);
                        assert!((1..=THREADS).contains(&delivered));
                        assert!(registry.deregister(&record));
                        broadcast_roster(&registry);

                        // Every roster delivered to a connection lists that
                        // connection, and nobody twice.
                        for roster in drain_rosters(&mut rx) {
                            assert!(roster.contains(&nick), "{:?} missing {}", roster, nick);
                            let mut unique = roster.clone();
                            unique.sort();
                            unique.dedup();
                            assert_eq!(unique.len(), roster.len());
                        }
                    }
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }
        assert!(registry.is_empty());
    }
}
