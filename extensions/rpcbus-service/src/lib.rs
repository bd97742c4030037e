mod error;
pub use error::RpcServiceError;

mod method_descriptor;
pub use method_descriptor::*;

mod method_registry;
pub use method_registry::*;

pub mod stub;
pub use stub::{StubCallable, StubEvent, StubProvider};
