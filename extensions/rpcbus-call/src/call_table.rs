use crate::{
    CallController, CallTableError, DisposalSignal, ServerMessageSender, ServiceBinding,
};
use rpcbus::message::{CallInfo, ClientMessage, ServerMessage};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex, PoisonError};

struct LiveCall {
    controller: Arc<CallController>,
    disposal: DisposalSignal,
    generation: u64,
}

/// The set of live calls for one client-facing service instance.
///
/// Routes client messages to their [`CallController`], removes calls once
/// their disposal signal fires, and disposes streaming calls whose response
/// stream reported `end` or `error`.
pub struct CallTable {
    service_id: u32,
    binding: ServiceBinding,
    send: ServerMessageSender,
    calls: HashMap<u32, LiveCall>,
    // Bumped per started call so a reused call ID is never confused with an
    // earlier call that shared it.
    next_generation: u64,
    // `(call_id, generation)` of calls whose response stream terminated,
    // filled from the send path.
    terminated: Arc<Mutex<Vec<(u32, u64)>>>,
}

impl CallTable {
    pub fn new(service_id: u32, binding: ServiceBinding, send: ServerMessageSender) -> Self {
        Self {
            service_id,
            binding,
            send,
            calls: HashMap::new(),
            next_generation: 0,
            terminated: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn service_id(&self) -> u32 {
        self.service_id
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn contains(&self, call_id: u32) -> bool {
        self.calls.contains_key(&call_id)
    }

    pub fn get(&self, call_id: u32) -> Option<Arc<CallController>> {
        self.calls
            .get(&call_id)
            .map(|live| Arc::clone(&live.controller))
    }

    /// Applies one client message.
    ///
    /// Writes, ends and terminations addressed to unknown calls are ignored.
    pub fn handle_message(&mut self, message: ClientMessage) -> Result<(), CallTableError> {
        self.reap();

        match message {
            ClientMessage::CallInit { call_id, info } => self.start_call(call_id, info),
            ClientMessage::CallSend { call_id, message } => {
                match self.calls.get(&call_id) {
                    Some(live) => live.controller.write(message),
                    None => tracing::debug!("call_send for unknown call {}", call_id),
                }
                Ok(())
            }
            ClientMessage::CallEnd { call_id } => {
                match self.calls.get(&call_id) {
                    Some(live) => live.controller.end_write(),
                    None => tracing::debug!("call_end for unknown call {}", call_id),
                }
                Ok(())
            }
            ClientMessage::CallTerminate { call_id } => {
                match self.calls.get(&call_id) {
                    Some(live) => live.controller.dispose(),
                    None => tracing::debug!("call_terminate for unknown call {}", call_id),
                }
                self.reap();
                Ok(())
            }
        }
    }

    fn start_call(&mut self, call_id: u32, info: CallInfo) -> Result<(), CallTableError> {
        if self.calls.contains_key(&call_id) {
            return Err(CallTableError::CallIdInUse(call_id));
        }

        let generation = self.next_generation;
        self.next_generation += 1;

        let (controller, disposal) = CallController::new(
            self.binding.clone(),
            call_id,
            self.service_id,
            info,
            self.observed_sender(generation),
        );

        if let Err(err) = controller.initiate() {
            tracing::warn!(
                "call {}/{} failed to start: {}",
                self.service_id,
                call_id,
                err
            );
            // Tell the client the call is over; the signal is dropped with
            // `disposal` since the call was never tracked.
            controller.dispose();
            return Err(CallTableError::Call {
                call_id,
                source: err,
            });
        }

        match self.calls.entry(call_id) {
            Entry::Occupied(_) => Err(CallTableError::CallIdInUse(call_id)),
            Entry::Vacant(entry) => {
                entry.insert(LiveCall {
                    controller,
                    disposal,
                    generation,
                });
                Ok(())
            }
        }
    }

    /// Wraps the outbound sender so terminal stream events are noticed.
    fn observed_sender(&self, generation: u64) -> ServerMessageSender {
        let send = Arc::clone(&self.send);
        let terminated = Arc::clone(&self.terminated);

        Arc::new(move |message: ServerMessage| {
            if let Some(event) = message.as_call_event() {
                if event.event.is_terminal() {
                    terminated
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push((event.call_id, generation));
                }
            }
            send(message);
        })
    }

    /// Removes disposed calls and disposes calls whose response stream has
    /// terminated. Returns the number of calls removed.
    pub fn reap(&mut self) -> usize {
        let mut removed = self.collect_disposed();

        let terminated = std::mem::take(
            &mut *self
                .terminated
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for (call_id, generation) in terminated {
            match self.calls.get(&call_id) {
                Some(live) if live.generation == generation => live.controller.dispose(),
                Some(_) => tracing::debug!(
                    "ignoring stale termination for reused call {}/{}",
                    self.service_id,
                    call_id
                ),
                None => {}
            }
        }

        removed += self.collect_disposed();
        removed
    }

    fn collect_disposed(&mut self) -> usize {
        let before = self.calls.len();
        let service_id = self.service_id;

        self.calls.retain(|call_id, live| match live.disposal.try_recv() {
            Ok(Some(_)) => {
                tracing::debug!("removing disposed call {}/{}", service_id, call_id);
                false
            }
            Ok(None) => true,
            // The controller dropped its signal without firing it.
            Err(_) => false,
        });

        before - self.calls.len()
    }

    /// Disposes every live call, e.g. when the service instance goes away.
    pub fn dispose_all(&mut self) {
        for live in self.calls.values() {
            live.controller.dispose();
        }
        self.calls.clear();
        self.terminated
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
