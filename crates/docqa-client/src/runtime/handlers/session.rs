use std::sync::Arc;

use docqa_core::service::{Credential, DocumentService};

use crate::events::{SessionUiEvent, UiEvent};

/// Exchanges identity claims for the user's profile and sessions.
pub async fn authenticate<S: DocumentService>(service: Arc<S>, credential: Credential) -> UiEvent {
    let event = match service.authenticate(&credential).await {
        Ok(response) => SessionUiEvent::Authenticated {
            user: response.user(),
            sessions: response.sessions,
        },
        Err(error) => SessionUiEvent::AuthenticateFailed { error },
    };
    UiEvent::Session(event)
}

pub async fn delete_conversation<S: DocumentService>(
    service: Arc<S>,
    user_id: String,
    session_id: String,
    document_id: String,
) -> UiEvent {
    let event = match service.delete_conversation(&user_id, &document_id).await {
        Ok(()) => SessionUiEvent::Deleted { session_id },
        Err(error) => SessionUiEvent::DeleteFailed { session_id, error },
    };
    UiEvent::Session(event)
}

pub async fn export_conversation<S: DocumentService>(
    service: Arc<S>,
    session_id: String,
) -> UiEvent {
    let event = match service.export_conversation_pdf(&session_id).await {
        Ok(bytes) => SessionUiEvent::Exported { session_id, bytes },
        Err(error) => SessionUiEvent::ExportFailed { session_id, error },
    };
    UiEvent::Session(event)
}
