use super::{StreamHandle, StubEventListener, WritableStream};
use crate::MethodShape;
use rpcbus::message::{Payload, PayloadObject};
use std::fmt;
use std::sync::Arc;

/// Single-response completion: `(error, response)`. Invoked at most once.
pub type UnaryCallback = Box<dyn FnOnce(Option<Payload>, Option<Payload>) + Send + 'static>;

pub trait UnaryMethod: Send + Sync {
    fn call(&self, arguments: PayloadObject, on_complete: UnaryCallback);
}

pub trait ClientStreamingMethod: Send + Sync {
    fn open(&self, on_complete: UnaryCallback) -> Box<dyn WritableStream>;
}

pub trait ServerStreamingMethod: Send + Sync {
    fn open(
        &self,
        arguments: Option<PayloadObject>,
        listener: StubEventListener,
    ) -> Box<dyn StreamHandle>;
}

pub trait BidiStreamingMethod: Send + Sync {
    fn open(&self, listener: StubEventListener) -> Box<dyn WritableStream>;
}

impl<F> UnaryMethod for F
where
    F: Fn(PayloadObject, UnaryCallback) + Send + Sync,
{
    fn call(&self, arguments: PayloadObject, on_complete: UnaryCallback) {
        self(arguments, on_complete)
    }
}

impl<F> ClientStreamingMethod for F
where
    F: Fn(UnaryCallback) -> Box<dyn WritableStream> + Send + Sync,
{
    fn open(&self, on_complete: UnaryCallback) -> Box<dyn WritableStream> {
        self(on_complete)
    }
}

impl<F> ServerStreamingMethod for F
where
    F: Fn(Option<PayloadObject>, StubEventListener) -> Box<dyn StreamHandle> + Send + Sync,
{
    fn open(
        &self,
        arguments: Option<PayloadObject>,
        listener: StubEventListener,
    ) -> Box<dyn StreamHandle> {
        self(arguments, listener)
    }
}

impl<F> BidiStreamingMethod for F
where
    F: Fn(StubEventListener) -> Box<dyn WritableStream> + Send + Sync,
{
    fn open(&self, listener: StubEventListener) -> Box<dyn WritableStream> {
        self(listener)
    }
}

/// An invocable stub, one variant per invocation shape.
#[derive(Clone)]
pub enum StubCallable {
    Unary(Arc<dyn UnaryMethod>),
    ClientStreaming(Arc<dyn ClientStreamingMethod>),
    ServerStreaming(Arc<dyn ServerStreamingMethod>),
    BidiStreaming(Arc<dyn BidiStreamingMethod>),
}

impl StubCallable {
    pub fn unary<F>(f: F) -> Self
    where
        F: Fn(PayloadObject, UnaryCallback) + Send + Sync + 'static,
    {
        StubCallable::Unary(Arc::new(f))
    }

    pub fn client_streaming<F>(f: F) -> Self
    where
        F: Fn(UnaryCallback) -> Box<dyn WritableStream> + Send + Sync + 'static,
    {
        StubCallable::ClientStreaming(Arc::new(f))
    }

    pub fn server_streaming<F>(f: F) -> Self
    where
        F: Fn(Option<PayloadObject>, StubEventListener) -> Box<dyn StreamHandle>
            + Send
            + Sync
            + 'static,
    {
        StubCallable::ServerStreaming(Arc::new(f))
    }

    pub fn bidi_streaming<F>(f: F) -> Self
    where
        F: Fn(StubEventListener) -> Box<dyn WritableStream> + Send + Sync + 'static,
    {
        StubCallable::BidiStreaming(Arc::new(f))
    }

    pub fn shape(&self) -> MethodShape {
        match self {
            StubCallable::Unary(_) => MethodShape::Unary,
            StubCallable::ClientStreaming(_) => MethodShape::ClientStreaming,
            StubCallable::ServerStreaming(_) => MethodShape::ServerStreaming,
            StubCallable::BidiStreaming(_) => MethodShape::BidiStreaming,
        }
    }
}

impl fmt::Debug for StubCallable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StubCallable").field(&self.shape()).finish()
    }
}
