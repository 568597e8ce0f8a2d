use axum::extract::ws::Message;
use std::sync::Arc;

use super::codec::{self, Frame};
use super::ConnectionRegistry;
use crate::chat::client::ClientRecord;

/// Broadcast a frame to every registered connection, sender included.
/// Returns how many connections the frame was queued for.
pub fn broadcast_to_all(registry: &ConnectionRegistry, frame: &Frame) -> usize {
    let text = codec::serialize(frame);
    registry.with_members(|members| deliver(members, &text))
}

/// Send a frame to a single connection.
pub fn send_to_connection(record: &ClientRecord, frame: &Frame) -> bool {
    deliver_one(record, codec::serialize(frame))
}

/// Queue `text` for each member. A member whose writer is gone is skipped;
/// its own session removes it from the registry when it closes.
pub(crate) fn deliver(members: &[Arc<ClientRecord>], text: &str) -> usize {
    members
        .iter()
        .filter(|record| deliver_one(record, text.to_string()))
        .count()
}

fn deliver_one(record: &ClientRecord, text: String) -> bool {
    match record.send(Message::Text(text.into())) {
        Ok(()) => true,
        Err(_) => {
            tracing::debug!(
                connection_id = %record.id(),
                "Recipient writer closed, skipping"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::codec::ProtocolMessage;
    use serde_json::json;
    use tokio::sync::mpsc;

    #[test]
    fn test_broadcast_skips_closed_recipient() {
        let registry = ConnectionRegistry::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, rx_b) = mpsc::unbounded_channel();
        let (tx_c, mut rx_c) = mpsc::unbounded_channel();
        registry.register(Arc::new(ClientRecord::new(tx_a)));
        registry.register(Arc::new(ClientRecord::new(tx_b)));
        registry.register(Arc::new(ClientRecord::new(tx_c)));
        drop(rx_b);

        let frame = Frame::stamped(ProtocolMessage::Message(json!("hi")));
        assert_eq!(broadcast_to_all(&registry, &frame), 2);

        assert!(matches!(rx_a.try_recv(), Ok(Message::Text(_))));
        assert!(matches!(rx_c.try_recv(), Ok(Message::Text(_))));
        // The dead recipient stays registered until its own close.
        assert_eq!(registry.len(), 3);
    }
}
