mod rpc_service_stub;
mod stream_handle;
mod stub_callable;
mod stub_event;

pub use rpc_service_stub::RpcServiceStub;
pub use stream_handle::{StreamHandle, WritableStream};
pub use stub_callable::*;
pub use stub_event::{StubEvent, StubEventListener};

/// Resolves a method name (as carried by a [`crate::MethodDescriptor`]) to an
/// invocable stub.
///
/// Providers are shared by every in-flight call and may be invoked
/// concurrently.
pub trait StubProvider: Send + Sync {
    fn resolve(&self, method_name: &str) -> Option<StubCallable>;
}

impl<T: StubProvider + ?Sized> StubProvider for std::sync::Arc<T> {
    fn resolve(&self, method_name: &str) -> Option<StubCallable> {
        (**self).resolve(method_name)
    }
}
