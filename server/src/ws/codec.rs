//! JSON text-frame codec for the chat protocol.
//!
//! Every frame is a single JSON object: an `action`, an action-specific
//! `data` payload and, on frames leaving the server, a `serverdate` stamp in
//! unix seconds. Keys the server does not interpret, at the top level or
//! inside a `changenick` payload, are carried through to the relayed frame.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::{SystemTime, UNIX_EPOCH};

pub const ACTION_MESSAGE: &str = "message";
pub const ACTION_CHANGE_NICK: &str = "changenick";
pub const ACTION_GET_ALL_NICKS: &str = "getallnicks";
pub const ACTION_ALL_NICKS: &str = "allnicks";

/// Reasons an inbound frame is rejected. None of these are ever reported
/// back to the sender; the frame is simply dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("frame is not a JSON object: {0}")]
    Decode(String),

    #[error("frame has no action")]
    MissingAction,

    #[error("unrecognized action {0}")]
    UnrecognizedAction(String),

    #[error("invalid {action} payload: {reason}")]
    InvalidPayload {
        action: &'static str,
        reason: String,
    },
}

/// Payload of a `changenick` request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NickChange {
    pub oldnick: String,
    pub newnick: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NickChange {
    pub fn new(oldnick: impl Into<String>, newnick: impl Into<String>) -> Self {
        Self {
            oldnick: oldnick.into(),
            newnick: newnick.into(),
            extra: Map::new(),
        }
    }
}

/// Payload of an `allnicks` roster.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Roster {
    pub allnicks: Vec<String>,
}

/// One protocol message, tagged by its action.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolMessage {
    /// Chat text. The payload is opaque to the server and relayed as-is.
    Message(Value),
    ChangeNick(NickChange),
    GetAllNicks,
    /// Server-originated roster.
    AllNicks(Roster),
}

impl ProtocolMessage {
    pub fn action(&self) -> &'static str {
        match self {
            Self::Message(_) => ACTION_MESSAGE,
            Self::ChangeNick(_) => ACTION_CHANGE_NICK,
            Self::GetAllNicks => ACTION_GET_ALL_NICKS,
            Self::AllNicks(_) => ACTION_ALL_NICKS,
        }
    }
}

/// A message plus the server timestamp it carries on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub message: ProtocolMessage,
    pub serverdate: Option<f64>,
    /// Top-level keys other than `action`, `data` and `serverdate`.
    pub extra: Map<String, Value>,
}

impl Frame {
    pub fn new(message: ProtocolMessage) -> Self {
        Self {
            message,
            serverdate: None,
            extra: Map::new(),
        }
    }

    /// Build a frame stamped with the current server time.
    pub fn stamped(message: ProtocolMessage) -> Self {
        Self::new(message).stamp()
    }

    /// Overwrite whatever `serverdate` the frame carried with the current
    /// server time.
    pub fn stamp(mut self) -> Self {
        self.serverdate = Some(server_now());
        self
    }
}

/// Current wall-clock time as fractional unix seconds.
pub fn server_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Decode and validate one inbound text frame.
pub fn parse(raw: &str) -> Result<Frame, CodecError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| CodecError::Decode(e.to_string()))?;

    let Value::Object(mut object) = value else {
        return Err(CodecError::Decode("expected a JSON object".to_string()));
    };

    let action = match object.remove("action") {
        None | Some(Value::Null) => return Err(CodecError::MissingAction),
        Some(Value::String(action)) if action.is_empty() => {
            return Err(CodecError::MissingAction)
        }
        Some(Value::String(action)) => action,
        Some(other) => return Err(CodecError::UnrecognizedAction(other.to_string())),
    };

    let data = object.remove("data").unwrap_or(Value::Null);
    let serverdate = object.remove("serverdate").as_ref().and_then(Value::as_f64);

    let message = match action.as_str() {
        ACTION_MESSAGE => ProtocolMessage::Message(data),
        ACTION_CHANGE_NICK => ProtocolMessage::ChangeNick(payload(ACTION_CHANGE_NICK, data)?),
        ACTION_GET_ALL_NICKS => ProtocolMessage::GetAllNicks,
        ACTION_ALL_NICKS => ProtocolMessage::AllNicks(payload(ACTION_ALL_NICKS, data)?),
        _ => return Err(CodecError::UnrecognizedAction(action)),
    };

    Ok(Frame {
        message,
        serverdate,
        extra: object,
    })
}

fn payload<T: DeserializeOwned>(action: &'static str, data: Value) -> Result<T, CodecError> {
    if !data.is_object() {
        return Err(CodecError::InvalidPayload {
            action,
            reason: "expected an object".to_string(),
        });
    }
    serde_json::from_value(data).map_err(|e| CodecError::InvalidPayload {
        action,
        reason: e.to_string(),
    })
}

/// Encode a frame as JSON text. Infallible.
pub fn serialize(frame: &Frame) -> String {
    let mut object = frame.extra.clone();
    object.insert("action".to_string(), Value::from(frame.message.action()));

    let data = match &frame.message {
        ProtocolMessage::Message(data) => Some(data.clone()),
        ProtocolMessage::ChangeNick(change) => {
            let mut data = change.extra.clone();
            data.insert("oldnick".to_string(), Value::from(change.oldnick.as_str()));
            data.insert("newnick".to_string(), Value::from(change.newnick.as_str()));
            Some(Value::Object(data))
        }
        ProtocolMessage::GetAllNicks => None,
        ProtocolMessage::AllNicks(roster) => Some(json!({ "allnicks": roster.allnicks })),
    };
    if let Some(data) = data {
        object.insert("data".to_string(), data);
    }

    if let Some(serverdate) = frame.serverdate {
        object.insert("serverdate".to_string(), json!(serverdate));
    }

    Value::Object(object).to_string()
}
