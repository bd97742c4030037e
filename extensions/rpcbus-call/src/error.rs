use rpcbus::message::ArgumentsError;
use rpcbus_service::DescriptorKind;
use thiserror::Error;

/// Reasons a call fails to start.
///
/// All of these are raised synchronously from
/// [`CallController::initiate`](crate::CallController::initiate) before the
/// stub is invoked. The call is treated as never started.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("call info must carry a method ID")]
    InvalidCallInfo,

    #[error("invalid call arguments: {0}")]
    InvalidArguments(#[from] ArgumentsError),

    #[error("method {method_id} not found")]
    MethodNotFound { method_id: String },

    #[error("method {method_id} is a {kind}, not an RPC method")]
    WrongDescriptorKind {
        method_id: String,
        kind: DescriptorKind,
    },

    #[error("method {method_name} is not implemented by the service stub")]
    MethodNotImplemented { method_name: String },

    #[error("method {method_id} requires an argument object of type {request_name}")]
    MissingRequiredArguments {
        method_id: String,
        request_name: String,
    },

    #[error("call has already been initiated")]
    AlreadyInitiated,

    #[error("call has been disposed")]
    Disposed,
}

/// Errors surfaced by [`CallTable`](crate::CallTable) while routing client
/// messages.
#[derive(Debug, Error)]
pub enum CallTableError {
    #[error("call ID {0} is already in use")]
    CallIdInUse(u32),

    #[error("call {call_id} failed to start: {source}")]
    Call {
        call_id: u32,
        #[source]
        source: CallError,
    },
}
