mod active_stream;

mod call_controller;
pub use call_controller::*;

mod call_event_forwarder;

mod call_table;
pub use call_table::*;

pub mod error;
pub use error::{CallError, CallTableError};

mod service_binding;
pub use service_binding::ServiceBinding;
