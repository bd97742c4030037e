use super::{CallInfo, Payload};
use serde::{Deserialize, Serialize};

/// Call-level messages sent by a client toward a service instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientMessage {
    /// Opens a new call.
    CallInit { call_id: u32, info: CallInfo },
    /// Writes one message into a request stream.
    CallSend { call_id: u32, message: Payload },
    /// Half-closes a request stream.
    CallEnd { call_id: u32 },
    /// Cancels a call outright.
    CallTerminate { call_id: u32 },
}

impl ClientMessage {
    pub fn call_id(&self) -> u32 {
        match self {
            ClientMessage::CallInit { call_id, .. }
            | ClientMessage::CallSend { call_id, .. }
            | ClientMessage::CallEnd { call_id }
            | ClientMessage::CallTerminate { call_id } => *call_id,
        }
    }
}
