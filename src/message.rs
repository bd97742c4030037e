mod call_event_kind;
mod call_info;
mod client_message;
mod payload;
mod server_message;

pub use call_event_kind::CallEventKind;
pub use call_info::{ArgumentsError, CallInfo};
pub use client_message::ClientMessage;
pub use payload::{Payload, PayloadObject};
pub use server_message::{CallEndedMessage, CallEventMessage, ServerMessage};
