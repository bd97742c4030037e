use thiserror::Error;

/// Errors raised while populating a method registry or service stub.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RpcServiceError {
    #[error("a descriptor for method ID {0:?} is already registered")]
    DuplicateMethodId(String),

    #[error("a callable for method {0:?} is already registered")]
    DuplicateCallable(String),
}
