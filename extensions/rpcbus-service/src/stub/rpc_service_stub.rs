use super::{StubCallable, StubProvider};
use crate::RpcServiceError;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// A [`StubProvider`] backed by a table of registered callables.
#[derive(Debug, Default)]
pub struct RpcServiceStub {
    callables: HashMap<String, StubCallable>,
}

impl RpcServiceStub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        method_name: impl Into<String>,
        callable: StubCallable,
    ) -> Result<(), RpcServiceError> {
        match self.callables.entry(method_name.into()) {
            Entry::Occupied(entry) => Err(RpcServiceError::DuplicateCallable(entry.key().clone())),
            Entry::Vacant(entry) => {
                tracing::trace!(
                    "registered {} stub for {}",
                    callable.shape(),
                    entry.key()
                );
                entry.insert(callable);
                Ok(())
            }
        }
    }
}

impl StubProvider for RpcServiceStub {
    fn resolve(&self, method_name: &str) -> Option<StubCallable> {
        self.callables.get(method_name).cloned()
    }
}
