//! Session store slice: user, session list, active file.

mod state;
mod update;

pub use state::{LoginOutcome, SessionState, dedup_sessions};
pub use update::*;
