use crate::active_stream::ActiveStream;
use crate::call_event_forwarder::CallEventForwarder;
use crate::{CallError, ServiceBinding};
use futures::channel::oneshot;
use rpcbus::message::{CallEventKind, CallInfo, Payload, PayloadObject, ServerMessage};
use rpcbus_service::stub::{UnaryCallback, WritableStream};
use rpcbus_service::{MethodDescriptor, MethodShape, StubCallable};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Function used to deliver outbound messages to the client transport.
pub type ServerMessageSender = Arc<dyn Fn(ServerMessage) + Send + Sync>;

/// Fires once, carrying the controller, when a call is disposed.
pub type DisposalSignal = oneshot::Receiver<Arc<CallController>>;

/// Lifecycle phase of a [`CallController`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CallPhase {
    Uninitiated,
    /// A unary or client-streaming call awaiting its single completion.
    UnaryPending,
    /// A server or bidirectional stream is open.
    StreamActive,
    Disposed,
}

struct CallState {
    phase: CallPhase,
    descriptor: Option<Arc<MethodDescriptor>>,
    stream: Option<ActiveStream>,
    on_disposed: Option<oneshot::Sender<Arc<CallController>>>,
}

/// Drives a single client call against a service stub.
///
/// A controller is created per client call, [`initiate`](Self::initiate)d
/// once, fed request messages through [`write`](Self::write) and
/// [`end_write`](Self::end_write), and finally [`dispose`](Self::dispose)d.
/// Disposal always sends `call_ended` to the client and fires the
/// [`DisposalSignal`] returned from [`new`](Self::new).
///
/// Unary and client-streaming calls dispose themselves when the stub reports
/// completion. Server and bidirectional streams forward their events but are
/// left open until the owner disposes them.
pub struct CallController {
    binding: ServiceBinding,
    call_id: u32,
    service_id: u32,
    call_info: CallInfo,
    forwarder: CallEventForwarder,
    state: Mutex<CallState>,
}

impl CallController {
    pub fn new(
        binding: ServiceBinding,
        call_id: u32,
        service_id: u32,
        call_info: CallInfo,
        send: ServerMessageSender,
    ) -> (Arc<Self>, DisposalSignal) {
        let (disposed_tx, disposed_rx) = oneshot::channel();

        let controller = Arc::new(Self {
            binding,
            call_id,
            service_id,
            call_info,
            forwarder: CallEventForwarder::new(call_id, service_id, send),
            state: Mutex::new(CallState {
                phase: CallPhase::Uninitiated,
                descriptor: None,
                stream: None,
                on_disposed: Some(disposed_tx),
            }),
        });

        (controller, disposed_rx)
    }

    pub fn call_id(&self) -> u32 {
        self.call_id
    }

    pub fn service_id(&self) -> u32 {
        self.service_id
    }

    pub fn call_info(&self) -> &CallInfo {
        &self.call_info
    }

    pub fn phase(&self) -> CallPhase {
        self.lock_state().phase
    }

    pub fn is_disposed(&self) -> bool {
        self.phase() == CallPhase::Disposed
    }

    /// The descriptor resolved during initiation.
    pub fn descriptor(&self) -> Option<Arc<MethodDescriptor>> {
        self.lock_state().descriptor.clone()
    }

    /// Validates the call info, resolves the method and invokes the stub in
    /// the pattern dictated by the method's streaming shape.
    pub fn initiate(self: &Arc<Self>) -> Result<(), CallError> {
        match self.phase() {
            CallPhase::Uninitiated => {}
            CallPhase::Disposed => return Err(CallError::Disposed),
            CallPhase::UnaryPending | CallPhase::StreamActive => {
                return Err(CallError::AlreadyInitiated);
            }
        }

        if !self.call_info.has_method_id() {
            return Err(CallError::InvalidCallInfo);
        }
        let method_id = self.call_info.method_id.as_str();

        let arguments = self.call_info.parse_arguments()?;

        let descriptor =
            self.binding
                .registry
                .lookup(method_id)
                .ok_or_else(|| CallError::MethodNotFound {
                    method_id: method_id.to_string(),
                })?;

        if !descriptor.is_rpc_method() {
            return Err(CallError::WrongDescriptorKind {
                method_id: method_id.to_string(),
                kind: descriptor.kind.clone(),
            });
        }

        let shape = descriptor.shape();
        let callable = self
            .binding
            .stubs
            .resolve(&descriptor.name)
            .filter(|callable| callable.shape() == shape)
            .ok_or_else(|| CallError::MethodNotImplemented {
                method_name: descriptor.name.clone(),
            })?;

        if shape == MethodShape::Unary && arguments.is_none() {
            return Err(CallError::MissingRequiredArguments {
                method_id: method_id.to_string(),
                request_name: descriptor.request_name.clone(),
            });
        }

        {
            let mut state = self.lock_state();
            if state.phase != CallPhase::Uninitiated {
                return Err(if state.phase == CallPhase::Disposed {
                    CallError::Disposed
                } else {
                    CallError::AlreadyInitiated
                });
            }
            state.phase = if shape.response_stream() {
                CallPhase::StreamActive
            } else {
                CallPhase::UnaryPending
            };
            state.descriptor = Some(Arc::clone(&descriptor));
        }

        tracing::debug!(
            "initiating {} call {}/{} to {}",
            shape,
            self.service_id,
            self.call_id,
            descriptor.name
        );

        self.dispatch(callable, arguments);

        Ok(())
    }

    fn dispatch(self: &Arc<Self>, callable: StubCallable, arguments: Option<PayloadObject>) {
        match callable {
            StubCallable::ClientStreaming(method) => {
                let mut stream = method.open(self.completion_callback());
                // Client-streaming calls rarely carry initial arguments; when
                // they do, they become the first request message. A stub that
                // already completed inside `open` gets no write.
                if let Some(arguments) = arguments {
                    if !self.is_disposed() {
                        stream.write(Payload::Object(arguments));
                    }
                }
                self.store_stream(ActiveStream::ClientStreaming(stream));
            }
            StubCallable::BidiStreaming(method) => {
                let stream = method.open(self.forwarder.listener());
                self.store_stream(ActiveStream::BidiStreaming(stream));
            }
            StubCallable::ServerStreaming(method) => {
                let stream = method.open(arguments, self.forwarder.listener());
                self.store_stream(ActiveStream::ServerStreaming(stream));
            }
            StubCallable::Unary(method) => {
                // Presence is checked before the phase transition.
                let arguments = arguments.unwrap_or_default();
                method.call(arguments, self.completion_callback());
            }
        }
    }

    fn completion_callback(self: &Arc<Self>) -> UnaryCallback {
        let controller = Arc::clone(self);
        Box::new(move |error, response| controller.handle_unary_completion(error, response))
    }

    /// Keeps `stream` as the live handle, or closes it if the call was
    /// disposed while the stub was being invoked.
    fn store_stream(&self, mut stream: ActiveStream) {
        {
            let mut state = self.lock_state();
            if state.phase != CallPhase::Disposed {
                state.stream = Some(stream);
                return;
            }
        }
        stream.close();
    }

    /// Forwards a request message to a request-streaming call.
    ///
    /// Ignored if the method does not stream requests, no stream is open, or
    /// the call has been disposed.
    pub fn write(&self, message: Payload) {
        self.with_writable("write", |stream| stream.write(message));
    }

    /// Half-closes the request stream. Ignored under the same conditions as
    /// [`write`](Self::write).
    pub fn end_write(&self) {
        self.with_writable("end_write", |stream| stream.end_write());
    }

    fn with_writable<F>(&self, op: &str, f: F)
    where
        F: FnOnce(&mut Box<dyn WritableStream>),
    {
        // The stream is taken out so the stub is never invoked under the
        // state lock; a completion fired from inside the stub may dispose.
        let mut stream = {
            let mut state = self.lock_state();
            let request_stream = state
                .descriptor
                .as_ref()
                .is_some_and(|descriptor| descriptor.request_stream);

            if state.phase == CallPhase::Disposed || !request_stream {
                tracing::trace!(
                    "ignoring {} on call {}/{} ({:?})",
                    op,
                    self.service_id,
                    self.call_id,
                    state.phase
                );
                return;
            }

            match state.stream.take() {
                Some(stream) if stream.is_writable() => stream,
                other => {
                    state.stream = other;
                    tracing::trace!(
                        "ignoring {} on call {}/{}: no writable stream",
                        op,
                        self.service_id,
                        self.call_id
                    );
                    return;
                }
            }
        };

        if let Some(writable) = stream.as_writable() {
            f(writable);
        }

        self.store_stream(stream);
    }

    /// Tears the call down.
    ///
    /// The first invocation sends `call_ended`, closes any live stream and
    /// fires the disposal signal, in that order. Later invocations do nothing.
    pub fn dispose(self: &Arc<Self>) {
        let (stream, on_disposed) = {
            let mut state = self.lock_state();
            if state.phase == CallPhase::Disposed {
                tracing::trace!(
                    "call {}/{} already disposed",
                    self.service_id,
                    self.call_id
                );
                return;
            }
            state.phase = CallPhase::Disposed;
            (state.stream.take(), state.on_disposed.take())
        };

        tracing::debug!("disposing call {}/{}", self.service_id, self.call_id);

        self.forwarder.end();

        if let Some(mut stream) = stream {
            stream.close();
        }

        if let Some(on_disposed) = on_disposed {
            // The receiver may have been dropped by an owner that does not
            // track this call.
            let _ = on_disposed.send(Arc::clone(self));
        }
    }

    /// Completion of a unary or client-streaming call.
    ///
    /// Forwards `error` and `data` events for whichever of the two are present
    /// and then disposes the call.
    pub fn handle_unary_completion(
        self: &Arc<Self>,
        error: Option<Payload>,
        response: Option<Payload>,
    ) {
        if let Some(error) = error.as_ref() {
            self.forwarder.forward(CallEventKind::Error, Some(error));
        }
        if let Some(response) = response.as_ref() {
            self.forwarder.forward(CallEventKind::Data, Some(response));
        }
        self.dispose();
    }

    fn lock_state(&self) -> MutexGuard<'_, CallState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for CallController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallController")
            .field("call_id", &self.call_id)
            .field("service_id", &self.service_id)
            .field("method_id", &self.call_info.method_id)
            .field("phase", &self.phase())
            .finish()
    }
}
