//! Cross-slice state mutations.
//!
//! Feature reducers return these to request changes outside their own slice.
//! The main reducer applies them in order.

use crate::features::notifications::Notification;

#[derive(Debug)]
pub enum StateMutation {
    Conversation(ConversationMutation),
    Notify(Notification),
}

/// Conversation slice mutations requested by other slices.
#[derive(Debug, PartialEq, Eq)]
pub enum ConversationMutation {
    /// Drop messages, optimistic state and any in-flight load or ask.
    Reset,
    /// Start loading history for a session, superseding any running load.
    StartLoad { session_id: String },
}

impl StateMutation {
    pub fn notify(notification: Notification) -> Self {
        StateMutation::Notify(notification)
    }

    pub fn reset_conversation() -> Self {
        StateMutation::Conversation(ConversationMutation::Reset)
    }

    pub fn start_load(session_id: impl Into<String>) -> Self {
        StateMutation::Conversation(ConversationMutation::StartLoad {
            session_id: session_id.into(),
        })
    }
}
