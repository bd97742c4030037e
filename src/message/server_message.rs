use super::CallEventKind;
use serde::{Deserialize, Serialize};

/// Notification that a call has been torn down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEndedMessage {
    pub call_id: u32,
    pub service_id: u32,
}

/// A stub event relayed to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEventMessage {
    pub service_id: u32,
    pub call_id: u32,
    /// JSON-serialized event payload.
    pub data: String,
    pub event: CallEventKind,
}

/// Messages sent from a service instance back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerMessage {
    CallEnded(CallEndedMessage),
    CallEvent(CallEventMessage),
}

impl ServerMessage {
    pub fn call_id(&self) -> u32 {
        match self {
            ServerMessage::CallEnded(msg) => msg.call_id,
            ServerMessage::CallEvent(msg) => msg.call_id,
        }
    }

    pub fn as_call_event(&self) -> Option<&CallEventMessage> {
        match self {
            ServerMessage::CallEvent(event) => Some(event),
            ServerMessage::CallEnded(_) => None,
        }
    }
}
