use rpcbus_service::{MethodRegistry, StubProvider};
use std::sync::Arc;

/// The registry and stub provider backing one service instance.
///
/// Both halves are shared read-only by every call opened against the service.
#[derive(Clone)]
pub struct ServiceBinding {
    pub registry: Arc<dyn MethodRegistry>,
    pub stubs: Arc<dyn StubProvider>,
}

impl ServiceBinding {
    pub fn new<R, S>(registry: R, stubs: S) -> Self
    where
        R: MethodRegistry + 'static,
        S: StubProvider + 'static,
    {
        Self {
            registry: Arc::new(registry),
            stubs: Arc::new(stubs),
        }
    }

    pub fn from_shared(registry: Arc<dyn MethodRegistry>, stubs: Arc<dyn StubProvider>) -> Self {
        Self { registry, stubs }
    }
}
