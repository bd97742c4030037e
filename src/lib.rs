pub mod constants;
pub mod message;
