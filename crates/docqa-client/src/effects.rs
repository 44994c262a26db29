//! Client effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes:
//! service calls (spawned as tasks), snapshot writes, and cancellation.
//! The reducer never performs I/O itself.

use docqa_core::model::{ActiveFile, Session, User};
use docqa_core::service::{Credential, UploadFile};
use tokio_util::sync::CancellationToken;

use crate::common::{TaskId, TaskKind};

#[derive(Debug)]
pub enum UiEffect {
    /// Exchange identity claims for a user profile and session list.
    Authenticate {
        task: TaskId,
        credential: Credential,
    },

    /// Fetch the history of a session.
    LoadConversation { task: TaskId, session_id: String },

    /// Send a question about the active session's document.
    Ask {
        task: TaskId,
        session_id: String,
        question: String,
    },

    /// Upload a document, creating a new session.
    Upload {
        task: TaskId,
        user_id: String,
        file: UploadFile,
    },

    /// Delete a conversation (and its document) remotely.
    DeleteConversation {
        task: TaskId,
        user_id: String,
        session_id: String,
        document_id: String,
    },

    /// Download the conversation transcript as PDF.
    ExportConversation { task: TaskId, session_id: String },

    /// Write the `{user, sessions}` snapshot entry.
    PersistUserSnapshot {
        user: Option<User>,
        sessions: Vec<Session>,
    },

    /// Write (or, for `None`, remove) the active file snapshot entry.
    PersistActiveFile { active_file: Option<ActiveFile> },

    /// Remove every snapshot entry.
    ClearSnapshot,

    /// Cancel an in-progress task.
    CancelTask {
        kind: TaskKind,
        token: Option<CancellationToken>,
    },
}
