//! An in-memory `echo.Echo` service with one method per invocation shape.
//!
//! | Method ID | Shape | Behavior |
//! |---|---|---|
//! | `echo.Echo/Say` | unary | responds with its arguments |
//! | `echo.Echo/Fail` | unary | completes with an error payload |
//! | `echo.Echo/Collect` | client-streaming | responds with every written message once the request side ends |
//! | `echo.Echo/Watch` | server-streaming | emits `count` data events, a status and `end`; errors when `count` is over `MAX_WATCH_COUNT` |
//! | `echo.Echo/Chat` | bidi-streaming | echoes each write; ends after the request side ends |
//!
//! `echo.Echo` itself is registered as a service descriptor, which is not
//! invocable.
mod echo;
pub use echo::*;
