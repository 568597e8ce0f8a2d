//! Per-connection participant state.

use axum::extract::ws::Message;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::error::SendError;
use uuid::Uuid;

use crate::ws::{ConnectionId, ConnectionSender};

/// Nick every participant starts with.
pub const DEFAULT_NICK: &str = "Anonymous";

/// One connected participant: the outbound queue of its socket and its
/// current nick.
///
/// The nick is only ever changed by the session that owns the record; other
/// sessions read it when building a roster.
#[derive(Debug)]
pub struct ClientRecord {
    id: ConnectionId,
    sender: ConnectionSender,
    nick: Mutex<String>,
}

impl ClientRecord {
    pub fn new(sender: ConnectionSender) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            nick: Mutex::new(DEFAULT_NICK.to_string()),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn nick(&self) -> String {
        self.lock_nick().clone()
    }

    /// Rename to `new_nick` if `old_nick` is the current nick.
    ///
    /// Returns false and leaves the nick untouched otherwise. Nothing stops
    /// two participants from claiming the same nick.
    pub fn change_nick(&self, old_nick: &str, new_nick: &str) -> bool {
        let mut nick = self.lock_nick();
        if *nick != old_nick {
            return false;
        }
        *nick = new_nick.to_string();
        true
    }

    /// Queue a message for this participant's socket. Fails once the
    /// connection's writer has stopped.
    pub fn send(&self, message: Message) -> Result<(), SendError<Message>> {
        self.sender.send(message)
    }

    fn lock_nick(&self) -> MutexGuard<'_, String> {
        self.nick.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
