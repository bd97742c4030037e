use crate::ServerMessageSender;
use rpcbus::constants::END_EVENT_DATA;
use rpcbus::message::{CallEndedMessage, CallEventKind, CallEventMessage, Payload, ServerMessage};
use rpcbus_service::{StubEvent, stub::StubEventListener};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Wraps stub output in envelopes addressed to one client call.
///
/// Once `call_ended` has gone out, later events for the call are dropped.
#[derive(Clone)]
pub(crate) struct CallEventForwarder {
    call_id: u32,
    service_id: u32,
    send: ServerMessageSender,
    ended: Arc<AtomicBool>,
}

impl CallEventForwarder {
    pub(crate) fn new(call_id: u32, service_id: u32, send: ServerMessageSender) -> Self {
        Self {
            call_id,
            service_id,
            send,
            ended: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn forward(&self, event: CallEventKind, payload: Option<&Payload>) {
        if self.ended.load(Ordering::Acquire) {
            tracing::trace!(
                "dropping {} event for ended call {}/{}",
                event,
                self.service_id,
                self.call_id
            );
            return;
        }

        let data = match payload {
            Some(payload) => match serde_json::to_string(payload) {
                Ok(data) => data,
                Err(err) => {
                    tracing::warn!(
                        "failed to serialize {} event for call {}/{}: {}",
                        event,
                        self.service_id,
                        self.call_id,
                        err
                    );
                    return;
                }
            },
            None => END_EVENT_DATA.to_string(),
        };

        tracing::trace!(
            "forwarding {} event for call {}/{}",
            event,
            self.service_id,
            self.call_id
        );

        (self.send)(ServerMessage::CallEvent(CallEventMessage {
            service_id: self.service_id,
            call_id: self.call_id,
            data,
            event,
        }));
    }

    /// Builds the listener handed to streaming stubs.
    pub(crate) fn listener(&self) -> StubEventListener {
        let forwarder = self.clone();
        Box::new(move |event: StubEvent| forwarder.forward(event.kind(), event.payload()))
    }

    /// Sends `call_ended`. Returns `false` if it was already sent.
    pub(crate) fn end(&self) -> bool {
        if self.ended.swap(true, Ordering::AcqRel) {
            return false;
        }

        (self.send)(ServerMessage::CallEnded(CallEndedMessage {
            call_id: self.call_id,
            service_id: self.service_id,
        }));
        true
    }
}
