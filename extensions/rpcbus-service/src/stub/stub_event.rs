use rpcbus::message::{CallEventKind, Payload};

/// Events emitted by a response stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StubEvent {
    Data(Payload),
    Status(Payload),
    Error(Payload),
    End,
}

impl StubEvent {
    pub fn kind(&self) -> CallEventKind {
        match self {
            StubEvent::Data(_) => CallEventKind::Data,
            StubEvent::Status(_) => CallEventKind::Status,
            StubEvent::Error(_) => CallEventKind::Error,
            StubEvent::End => CallEventKind::End,
        }
    }

    pub fn payload(&self) -> Option<&Payload> {
        match self {
            StubEvent::Data(payload) | StubEvent::Status(payload) | StubEvent::Error(payload) => {
                Some(payload)
            }
            StubEvent::End => None,
        }
    }
}

/// Listener handed to streaming stubs. Events are delivered sequentially.
pub type StubEventListener = Box<dyn FnMut(StubEvent) + Send + 'static>;
