use rpcbus::message::{Payload, PayloadObject};
use rpcbus_service::stub::{
    RpcServiceStub, StreamHandle, StubEventListener, UnaryCallback, WritableStream,
};
use rpcbus_service::{
    DescriptorKind, MethodDescriptor, MethodShape, RpcMethodRegistry, RpcServiceError,
    StubCallable, StubEvent,
};
use serde_json::json;

pub const SERVICE_ID: &str = "echo.Echo";
pub const SAY_METHOD_ID: &str = "echo.Echo/Say";
pub const FAIL_METHOD_ID: &str = "echo.Echo/Fail";
pub const COLLECT_METHOD_ID: &str = "echo.Echo/Collect";
pub const WATCH_METHOD_ID: &str = "echo.Echo/Watch";
pub const CHAT_METHOD_ID: &str = "echo.Echo/Chat";

/// Default number of `data` events emitted by `Watch`.
pub const DEFAULT_WATCH_COUNT: u64 = 3;

/// Largest `count` `Watch` accepts; larger requests end in an `error` event.
pub const MAX_WATCH_COUNT: u64 = 100;

fn status_ok() -> Payload {
    json!({ "code": 0, "details": "OK" })
}

fn status_cancelled() -> Payload {
    json!({ "code": 1, "details": "Cancelled" })
}

/// Descriptors for every `echo.Echo` entry.
pub fn echo_registry() -> Result<RpcMethodRegistry, RpcServiceError> {
    let mut registry = RpcMethodRegistry::new();
    registry.register(
        SAY_METHOD_ID,
        MethodDescriptor::rpc("Say", "echo.SayRequest", MethodShape::Unary),
    )?;
    registry.register(
        FAIL_METHOD_ID,
        MethodDescriptor::rpc("Fail", "echo.SayRequest", MethodShape::Unary),
    )?;
    registry.register(
        COLLECT_METHOD_ID,
        MethodDescriptor::rpc("Collect", "echo.SayRequest", MethodShape::ClientStreaming),
    )?;
    registry.register(
        WATCH_METHOD_ID,
        MethodDescriptor::rpc("Watch", "echo.WatchRequest", MethodShape::ServerStreaming),
    )?;
    registry.register(
        CHAT_METHOD_ID,
        MethodDescriptor::rpc("Chat", "echo.SayRequest", MethodShape::BidiStreaming),
    )?;
    registry.register(
        SERVICE_ID,
        MethodDescriptor::rpc("Echo", "", MethodShape::Unary).with_kind(DescriptorKind::Service),
    )?;
    Ok(registry)
}

/// Stub callables for every `echo.Echo` method.
pub fn echo_stub() -> Result<RpcServiceStub, RpcServiceError> {
    let mut stub = RpcServiceStub::new();

    stub.register(
        "Say",
        StubCallable::unary(|arguments: PayloadObject, on_complete: UnaryCallback| {
            on_complete(None, Some(Payload::Object(arguments)))
        }),
    )?;

    stub.register(
        "Fail",
        StubCallable::unary(|arguments: PayloadObject, on_complete: UnaryCallback| {
            on_complete(
                Some(json!({ "code": 3, "details": "Fail always fails", "request": arguments })),
                None,
            )
        }),
    )?;

    stub.register(
        "Collect",
        StubCallable::client_streaming(|on_complete: UnaryCallback| {
            Box::new(CollectStream {
                messages: Vec::new(),
                on_complete: Some(on_complete),
            }) as Box<dyn WritableStream>
        }),
    )?;

    stub.register(
        "Watch",
        StubCallable::server_streaming(
            |arguments: Option<PayloadObject>, mut listener: StubEventListener| {
                let count = arguments
                    .as_ref()
                    .and_then(|args| args.get("count"))
                    .and_then(Payload::as_u64)
                    .unwrap_or(DEFAULT_WATCH_COUNT);

                if count > MAX_WATCH_COUNT {
                    listener(StubEvent::Error(json!({
                        "code": 11,
                        "details": format!("count {count} exceeds {MAX_WATCH_COUNT}"),
                    })));
                    return Box::new(FinishedStream) as Box<dyn StreamHandle>;
                }

                for index in 0..count {
                    listener(StubEvent::Data(json!({ "index": index })));
                }
                listener(StubEvent::Status(status_ok()));
                listener(StubEvent::End);

                Box::new(FinishedStream) as Box<dyn StreamHandle>
            },
        ),
    )?;

    stub.register(
        "Chat",
        StubCallable::bidi_streaming(|listener: StubEventListener| {
            Box::new(ChatStream {
                listener,
                ended: false,
            }) as Box<dyn WritableStream>
        }),
    )?;

    Ok(stub)
}

/// Buffers request messages and answers once with all of them.
struct CollectStream {
    messages: Vec<Payload>,
    on_complete: Option<UnaryCallback>,
}

impl StreamHandle for CollectStream {
    fn close(&mut self) {
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(Some(status_cancelled()), None);
        }
    }
}

impl WritableStream for CollectStream {
    fn write(&mut self, message: Payload) {
        if self.on_complete.is_some() {
            self.messages.push(message);
        }
    }

    fn end_write(&mut self) {
        if let Some(on_complete) = self.on_complete.take() {
            let messages = std::mem::take(&mut self.messages);
            on_complete(None, Some(json!({ "messages": messages })));
        }
    }
}

/// A response stream that has already delivered everything.
struct FinishedStream;

impl StreamHandle for FinishedStream {
    fn close(&mut self) {}
}

/// Echoes each request message back as a `data` event.
struct ChatStream {
    listener: StubEventListener,
    ended: bool,
}

impl StreamHandle for ChatStream {
    fn close(&mut self) {
        if !self.ended {
            self.ended = true;
            (self.listener)(StubEvent::Error(status_cancelled()));
        }
    }
}

impl WritableStream for ChatStream {
    fn write(&mut self, message: Payload) {
        if !self.ended {
            (self.listener)(StubEvent::Data(message));
        }
    }

    fn end_write(&mut self) {
        if !self.ended {
            self.ended = true;
            (self.listener)(StubEvent::Status(status_ok()));
            (self.listener)(StubEvent::End);
        }
    }
}
