//! Client events.
//!
//! Commands come from the front end; result events come back from runtime
//! handlers, wrapped in `TaskCompleted` so stale results can be dropped.

use docqa_core::model::{ActiveFile, Message, Session, User};
use docqa_core::service::{Credential, ServiceError, UploadFile};
use docqa_core::snapshot::RestoredSnapshot;

use crate::common::{TaskCompleted, TaskId, TaskKind, TaskStarted};

#[derive(Debug)]
pub enum UiEvent {
    /// Repopulate state from the persisted snapshot.
    Restore(RestoredSnapshot),

    Authenticate {
        credential: Credential,
    },
    Login {
        user: User,
        sessions: Vec<Session>,
    },
    Logout,
    AddSession(Session),
    RemoveSession {
        session_id: String,
    },
    SetActiveFile(Option<ActiveFile>),
    SelectSession {
        session_id: String,
    },
    NewConversation,
    /// Load history for the active session, or clear the list for `None`.
    LoadConversation {
        session_id: Option<String>,
    },

    InputChanged(String),
    SubmitInput,

    UploadFile {
        file: Option<UploadFile>,
    },
    DeleteConversation {
        session_id: String,
    },
    ExportConversation {
        session_id: String,
    },

    TaskStarted {
        kind: TaskKind,
        started: TaskStarted,
    },
    TaskCompleted {
        kind: TaskKind,
        completed: TaskCompleted<Box<UiEvent>>,
    },
    TaskCancelled {
        kind: TaskKind,
        id: TaskId,
    },

    Session(SessionUiEvent),
    Conversation(ConversationUiEvent),
    Upload(UploadUiEvent),
}

#[derive(Debug)]
pub enum SessionUiEvent {
    Authenticated {
        user: User,
        sessions: Vec<Session>,
    },
    AuthenticateFailed {
        error: ServiceError,
    },
    Deleted {
        session_id: String,
    },
    DeleteFailed {
        session_id: String,
        error: ServiceError,
    },
    Exported {
        session_id: String,
        bytes: Vec<u8>,
    },
    ExportFailed {
        session_id: String,
        error: ServiceError,
    },
}

#[derive(Debug)]
pub enum ConversationUiEvent {
    Loaded {
        session_id: String,
        messages: Vec<Message>,
    },
    LoadFailed {
        session_id: String,
        error: ServiceError,
    },
    Answered {
        session_id: String,
        answer: String,
    },
    AskFailed {
        session_id: String,
        error: ServiceError,
    },
}

#[derive(Debug)]
pub enum UploadUiEvent {
    Uploaded { session: Session },
    Failed { error: ServiceError },
}
