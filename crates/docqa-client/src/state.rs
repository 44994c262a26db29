//! Application state composition.
//!
//! ```text
//! AppState
//! ├── session: SessionState           (user, sessions, active file)
//! ├── conversation: ConversationState (messages, input, dispatch)
//! ├── notifications: Notifications    (pending user-facing notices)
//! ├── exported: Option<ExportedConversation>
//! ├── task_seq: TaskSeq               (async task id generator)
//! └── tasks: Tasks                    (task lifecycle state)
//! ```
//!
//! Only the reducer mutates it.

use docqa_core::model::Message;

use crate::common::{TaskSeq, Tasks};
use crate::features::conversation::ConversationState;
use crate::features::notifications::Notifications;
use crate::features::session::SessionState;

/// A finished PDF export, waiting for the front end to pick it up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedConversation {
    pub session_id: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct AppState {
    pub session: SessionState,
    pub conversation: ConversationState,
    pub notifications: Notifications,
    pub exported: Option<ExportedConversation>,
    pub task_seq: TaskSeq,
    pub tasks: Tasks,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The displayed message list.
    pub fn messages(&self) -> &[Message] {
        &self.conversation.messages
    }

    pub fn take_export(&mut self) -> Option<ExportedConversation> {
        self.exported.take()
    }
}
