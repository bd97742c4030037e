use serde::{Deserialize, Serialize};
use std::fmt;

/// The kinds of stub events forwarded to the client as `call_event` messages.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallEventKind {
    Data,
    Status,
    Error,
    End,
}

impl CallEventKind {
    /// Wire label for this event kind.
    pub fn as_str(self) -> &'static str {
        match self {
            CallEventKind::Data => "data",
            CallEventKind::Status => "status",
            CallEventKind::Error => "error",
            CallEventKind::End => "end",
        }
    }

    /// Whether this event marks the end of a response stream.
    pub fn is_terminal(self) -> bool {
        matches!(self, CallEventKind::Error | CallEventKind::End)
    }
}

impl fmt::Display for CallEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
