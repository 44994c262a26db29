//! Conversation feature reducer: history loading and question dispatch.

use chrono::{DateTime, Utc};
use docqa_core::model::Message;
use tracing::{debug, warn};

use super::state::ConversationState;
use crate::error::ClientError;
use crate::events::ConversationUiEvent;
use crate::features::notifications::{self, Notification};
use crate::features::session::SessionState;
use crate::mutations::StateMutation;

/// A question that passed every precondition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub session_id: String,
    pub question: String,
}

/// Checks whether the input buffer can be sent.
///
/// Order matters: a signed-out user is told to sign in even when the input is
/// empty; every other rejection is silent.
pub fn prepare_dispatch(
    session: &SessionState,
    conversation: &ConversationState,
) -> Result<Dispatch, ClientError> {
    if !session.is_authenticated() {
        return Err(ClientError::auth_required(notifications::SIGN_IN_TO_SEND));
    }
    let question = conversation.input.trim();
    if question.is_empty() {
        return Err(ClientError::validation("empty question"));
    }
    let Some(session_id) = session.active_session_id() else {
        return Err(ClientError::validation("no active session"));
    };
    if conversation.dispatch.is_sending() {
        return Err(ClientError::validation("a question is already being answered"));
    }
    Ok(Dispatch {
        session_id: session_id.to_string(),
        question: question.to_string(),
    })
}

/// Applies a history or dispatch result.
///
/// Results for a session other than the active one are dropped. The task slot
/// check upstream already filters these; this guards against a result whose
/// task survived a reselection of the same slot.
pub fn handle_conversation_event(
    conversation: &mut ConversationState,
    session: &SessionState,
    event: ConversationUiEvent,
    now: DateTime<Utc>,
) -> Vec<StateMutation> {
    match event {
        ConversationUiEvent::Loaded {
            session_id,
            messages,
        } => {
            if !session.is_active(&session_id) {
                warn!(session_id, "dropping history for inactive session");
                return vec![];
            }
            debug!(session_id, count = messages.len(), "history loaded");
            conversation.replace_history(messages);
            vec![]
        }
        ConversationUiEvent::LoadFailed { session_id, error } => {
            if !session.is_active(&session_id) {
                return vec![];
            }
            warn!(session_id, error = %error, "history load failed");
            conversation.replace_history(Vec::new());
            vec![StateMutation::notify(Notification::error(
                notifications::LOAD_FAILED,
            ))]
        }
        ConversationUiEvent::Answered { session_id, answer } => {
            if !session.is_active(&session_id) {
                warn!(session_id, "dropping answer for inactive session");
                return vec![];
            }
            conversation.resolve_dispatch(answer, now);
            vec![]
        }
        ConversationUiEvent::AskFailed { session_id, error } => {
            if !session.is_active(&session_id) {
                return vec![];
            }
            warn!(session_id, error = %error, "ask failed");
            conversation.fail_dispatch();
            let err = ClientError::Transport(error);
            Notification::from_error(&err, notifications::SEND_FAILED)
                .map(StateMutation::notify)
                .into_iter()
                .collect()
        }
    }
}

/// History for the loader: server order, roles already normalized.
pub fn history_to_messages(records: Vec<docqa_core::service::HistoryRecord>) -> Vec<Message> {
    records.into_iter().map(Message::from).collect()
}

#[cfg(test)]
mod tests {
    use docqa_core::model::{ActiveFile, Document, Sender, Session, User};
    use docqa_core::service::ServiceError;

    use super::*;

    fn signed_in(active: bool) -> SessionState {
        let mut state = SessionState::default();
        let session = Session {
            session_id: "s1".to_string(),
            created_at: String::new(),
            document: Document {
                document_id: "d1".to_string(),
                filename: "report.pdf".to_string(),
                file_url: String::new(),
                upload_time: None,
            },
        };
        state.login(
            User {
                id: "u1".to_string(),
                name: String::new(),
                email: String::new(),
            },
            vec![session.clone()],
        );
        if active {
            state.set_active_file(Some(ActiveFile::from_session(&session)));
        }
        state
    }

    fn with_input(input: &str) -> ConversationState {
        let mut conv = ConversationState::default();
        conv.input.push_str(input);
        conv
    }

    #[test]
    fn test_signed_out_dispatch_requires_auth_even_with_empty_input() {
        let err = prepare_dispatch(&SessionState::default(), &with_input("")).unwrap_err();
        assert_eq!(
            err,
            ClientError::AuthRequired(notifications::SIGN_IN_TO_SEND.to_string())
        );
    }

    #[test]
    fn test_whitespace_input_is_silently_rejected() {
        let err = prepare_dispatch(&signed_in(true), &with_input("   ")).unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn test_no_active_session_is_silently_rejected() {
        let err = prepare_dispatch(&signed_in(false), &with_input("hi")).unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn test_dispatch_trims_question() {
        let dispatch = prepare_dispatch(&signed_in(true), &with_input("  hi \n")).unwrap();
        assert_eq!(dispatch.session_id, "s1");
        assert_eq!(dispatch.question, "hi");
    }

    #[test]
    fn test_second_dispatch_while_sending_is_rejected() {
        let session = signed_in(true);
        let mut conversation = with_input("one");
        conversation.begin_dispatch("one".to_string(), Utc::now());
        conversation.input = "two".to_string();
        assert!(matches!(
            prepare_dispatch(&session, &conversation),
            Err(ClientError::Validation(_))
        ));
    }

    #[test]
    fn test_load_failure_empties_list_with_one_error() {
        let session = signed_in(true);
        let mut conversation = ConversationState::default();
        let mutations = handle_conversation_event(
            &mut conversation,
            &session,
            ConversationUiEvent::LoadFailed {
                session_id: "s1".to_string(),
                error: ServiceError::transport("refused"),
            },
            Utc::now(),
        );
        assert!(conversation.messages.is_empty());
        assert_eq!(mutations.len(), 1);
    }

    #[test]
    fn test_answer_for_inactive_session_is_dropped() {
        let session = signed_in(false);
        let mut conversation = ConversationState::default();
        handle_conversation_event(
            &mut conversation,
            &session,
            ConversationUiEvent::Answered {
                session_id: "s1".to_string(),
                answer: "42".to_string(),
            },
            Utc::now(),
        );
        assert!(conversation.messages.is_empty());
    }

    #[test]
    fn test_answer_appends_assistant_message() {
        let session = signed_in(true);
        let mut conversation = ConversationState::default();
        conversation.begin_dispatch("What is the total?".to_string(), Utc::now());
        handle_conversation_event(
            &mut conversation,
            &session,
            ConversationUiEvent::Answered {
                session_id: "s1".to_string(),
                answer: "42".to_string(),
            },
            Utc::now(),
        );

        let tail: Vec<(Sender, &str)> = conversation
            .messages
            .iter()
            .map(|m| (m.sender, m.content.as_str()))
            .collect();
        assert_eq!(
            tail,
            vec![
                (Sender::User, "What is the total?"),
                (Sender::Assistant, "42")
            ]
        );
        assert!(!conversation.typing);
    }
}
