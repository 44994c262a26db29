//! Conversation slice: the message list of the active session, history
//! loading, and question dispatch.

mod state;
mod update;

pub use state::{ConversationState, DispatchState};
pub use update::{Dispatch, handle_conversation_event, history_to_messages, prepare_dispatch};
