use std::sync::Arc;

use docqa_core::service::DocumentService;

use crate::events::{ConversationUiEvent, UiEvent};
use crate::features::conversation::history_to_messages;

/// Fetches the history of a session.
pub async fn load_conversation<S: DocumentService>(service: Arc<S>, session_id: String) -> UiEvent {
    let event = match service.get_history(&session_id).await {
        Ok(records) => ConversationUiEvent::Loaded {
            session_id,
            messages: history_to_messages(records),
        },
        Err(error) => ConversationUiEvent::LoadFailed { session_id, error },
    };
    UiEvent::Conversation(event)
}

/// Sends a question and waits for the answer.
pub async fn ask<S: DocumentService>(
    service: Arc<S>,
    session_id: String,
    question: String,
) -> UiEvent {
    let event = match service.ask(&session_id, &question).await {
        Ok(response) => ConversationUiEvent::Answered {
            session_id,
            answer: response.answer,
        },
        Err(error) => ConversationUiEvent::AskFailed { session_id, error },
    };
    UiEvent::Conversation(event)
}
