//! Per-connection session state machine: `Connecting → Open → Closed`.
//!
//! The session knows nothing about sockets. It owns the connection's
//! [`ClientRecord`] and talks to the outside world only through the record's
//! outbound queue and the shared [`ConnectionRegistry`].

use std::sync::Arc;

use crate::chat::client::ClientRecord;
use crate::chat::roster;
use crate::ws::protocol::{self, DropReason, FrameOutcome};
use crate::ws::{ConnectionId, ConnectionRegistry, ConnectionSender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Open,
    Closed,
}

#[derive(Debug)]
pub struct Session {
    state: SessionState,
    record: Arc<ClientRecord>,
    registry: ConnectionRegistry,
}

impl Session {
    /// A freshly accepted connection, not yet visible to anyone.
    pub fn accept(registry: ConnectionRegistry, sender: ConnectionSender) -> Self {
        Self {
            state: SessionState::Connecting,
            record: Arc::new(ClientRecord::new(sender)),
            registry,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.record.id()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn record(&self) -> &ClientRecord {
        &self.record
    }

    /// `Connecting → Open`: register the record and announce the new roster
    /// to everyone, this connection included.
    pub fn open(&mut self) {
        if self.state != SessionState::Connecting {
            return;
        }
        let connections = self.registry.register(self.record.clone());
        self.state = SessionState::Open;
        tracing::info!(
            connection_id = %self.id(),
            connections,
            "WebSocket opened"
        );
        roster::broadcast_roster(&self.registry);
    }

    /// Process one inbound text frame. The session stays `Open` whatever the
    /// frame contains.
    pub fn handle_text(&self, raw: &str) -> FrameOutcome {
        if self.state != SessionState::Open {
            return FrameOutcome::Dropped(DropReason::SessionNotOpen);
        }
        protocol::handle_text_message(raw, &self.record, &self.registry)
    }

    /// `Open → Closed`: deregister and announce the roster to whoever is left.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let was_open = self.state == SessionState::Open;
        self.state = SessionState::Closed;
        if !was_open {
            return;
        }

        self.registry.deregister(&self.record);
        tracing::info!(
            connection_id = %self.id(),
            nick = %self.record.nick(),
            connections = self.registry.len(),
            "WebSocket closed"
        );
        roster::broadcast_roster(&self.registry);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}
