use crate::{MethodDescriptor, RpcServiceError};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

/// Resolves a client-supplied method identifier to its descriptor.
///
/// Implementations are read-only once calls start flowing and must be safe to
/// share across every in-flight call.
pub trait MethodRegistry: Send + Sync {
    fn lookup(&self, method_id: &str) -> Option<Arc<MethodDescriptor>>;
}

impl<T: MethodRegistry + ?Sized> MethodRegistry for Arc<T> {
    fn lookup(&self, method_id: &str) -> Option<Arc<MethodDescriptor>> {
        (**self).lookup(method_id)
    }
}

/// In-memory registry keyed by method identifier.
#[derive(Debug, Default)]
pub struct RpcMethodRegistry {
    descriptors: HashMap<String, Arc<MethodDescriptor>>,
}

impl RpcMethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `descriptor` under `method_id`.
    pub fn register(
        &mut self,
        method_id: &str,
        descriptor: MethodDescriptor,
    ) -> Result<(), RpcServiceError> {
        match self.descriptors.entry(method_id.to_string()) {
            Entry::Occupied(_) => Err(RpcServiceError::DuplicateMethodId(method_id.to_string())),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(descriptor));
                Ok(())
            }
        }
    }

    pub fn method_ids(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl MethodRegistry for RpcMethodRegistry {
    fn lookup(&self, method_id: &str) -> Option<Arc<MethodDescriptor>> {
        self.descriptors.get(method_id).cloned()
    }
}
