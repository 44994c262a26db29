//! Effect handlers for the client runtime.
//!
//! Handlers are pure async functions that call the document service and
//! return a `UiEvent`. They do not touch state; the runtime spawns them and
//! feeds the result back through the reducer.

pub mod conversation;
pub mod session;
pub mod upload;

pub use conversation::*;
pub use session::*;
pub use upload::*;
