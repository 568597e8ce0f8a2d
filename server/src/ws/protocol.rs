use crate::chat::client::ClientRecord;
use crate::chat::roster;
use crate::ws::broadcast::broadcast_to_all;
use crate::ws::codec::{self, CodecError, Frame, ProtocolMessage};
use crate::ws::ConnectionRegistry;

/// What happened to one inbound text frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Relayed to every registered connection.
    Broadcast { recipients: usize },
    /// Answered to the sender only.
    Replied,
    /// Dropped without any reply.
    Dropped(DropReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    Invalid(CodecError),
    NickMismatch,
    /// Clients may not send `allnicks`.
    ServerOnly,
    /// The requester's own writer is gone.
    RecipientGone,
    SessionNotOpen,
}

/// Handle an incoming text frame from `record`.
/// Decodes it, stamps `serverdate`, and dispatches on the action.
pub fn handle_text_message(
    raw: &str,
    record: &ClientRecord,
    registry: &ConnectionRegistry,
) -> FrameOutcome {
    let frame = match codec::parse(raw) {
        Ok(frame) => frame,
        Err(err) => {
            match &err {
                CodecError::Decode(_) => tracing::warn!(
                    connection_id = %record.id(),
                    error = %err,
                    "Invalid message received: {}",
                    raw.chars().take(100).collect::<String>()
                ),
                _ => tracing::debug!(
                    connection_id = %record.id(),
                    error = %err,
                    "Dropping frame"
                ),
            }
            return FrameOutcome::Dropped(DropReason::Invalid(err));
        }
    };

    dispatch(frame.stamp(), record, registry)
}

fn dispatch(frame: Frame, record: &ClientRecord, registry: &ConnectionRegistry) -> FrameOutcome {
    match &frame.message {
        ProtocolMessage::Message(_) => FrameOutcome::Broadcast {
            recipients: broadcast_to_all(registry, &frame),
        },
        ProtocolMessage::ChangeNick(change) => {
            if record.change_nick(&change.oldnick, &change.newnick) {
                tracing::info!(
                    connection_id = %record.id(),
                    old_nick = %change.oldnick,
                    new_nick = %change.newnick,
                    "Changed nick"
                );
                FrameOutcome::Broadcast {
                    recipients: broadcast_to_all(registry, &frame),
                }
            } else {
                tracing::info!(
                    connection_id = %record.id(),
                    nick = %record.nick(),
                    old_nick = %change.oldnick,
                    new_nick = %change.newnick,
                    "Can't change nick, old nick does not match"
                );
                FrameOutcome::Dropped(DropReason::NickMismatch)
            }
        }
        ProtocolMessage::GetAllNicks => {
            if roster::send_roster(registry, record) {
                FrameOutcome::Replied
            } else {
                FrameOutcome::Dropped(DropReason::RecipientGone)
            }
        }
        ProtocolMessage::AllNicks(_) => {
            tracing::debug!(
                connection_id = %record.id(),
                "Ignoring client-sent allnicks"
            );
            FrameOutcome::Dropped(DropReason::ServerOnly)
        }
    }
}
