//! Session feature reducer.
//!
//! Every change to the session list or active file is followed by the
//! matching snapshot effect, so persisted state trails in-memory state by at
//! most one reducer step.

use docqa_core::model::{ActiveFile, Session, User};
use docqa_core::snapshot::{CURRENT_FILE_KEY, RestoredSnapshot};
use tracing::{debug, warn};

use super::state::SessionState;
use crate::common::TaskId;
use crate::effects::UiEffect;
use crate::error::ClientError;
use crate::features::notifications::{self, Notification};
use crate::mutations::StateMutation;

type Output = (Vec<UiEffect>, Vec<StateMutation>);

fn persist_user(state: &SessionState) -> UiEffect {
    UiEffect::PersistUserSnapshot {
        user: state.user.clone(),
        sessions: state.sessions.clone(),
    }
}

fn persist_active_file(state: &SessionState) -> UiEffect {
    UiEffect::PersistActiveFile {
        active_file: state.active_file.clone(),
    }
}

pub fn restore(state: &mut SessionState, restored: RestoredSnapshot) -> Vec<UiEffect> {
    for key in &restored.discarded {
        let err = ClientError::MalformedPersistedState((*key).to_string());
        warn!(error = %err, "starting without persisted entry");
    }

    let dropped = state.restore(restored.user, restored.sessions, restored.active_file);
    if dropped {
        warn!(
            key = CURRENT_FILE_KEY,
            "restored active file has no matching session"
        );
        return vec![persist_active_file(state)];
    }
    vec![]
}

pub fn login(state: &mut SessionState, user: User, sessions: Vec<Session>) -> Output {
    let outcome = state.login(user, sessions);
    if outcome.unchanged {
        debug!("login with unchanged profile");
        return (vec![], vec![]);
    }

    let mut effects = vec![persist_user(state)];
    let mut mutations = Vec::new();
    if outcome.active_cleared {
        effects.push(persist_active_file(state));
        mutations.push(StateMutation::reset_conversation());
    }
    mutations.push(StateMutation::notify(Notification::success(
        notifications::LOGGED_IN,
    )));
    debug!(sessions = state.sessions.len(), "logged in");
    (effects, mutations)
}

/// Login from a fresh authentication, then activate a conversation.
///
/// The current active session is kept (and reloaded) when it survived the
/// login; otherwise the most recent session becomes active.
pub fn authenticated(state: &mut SessionState, user: User, sessions: Vec<Session>) -> Output {
    let (mut effects, mut mutations) = login(state, user, sessions);

    if let Some(active) = state.active_session_id() {
        mutations.push(StateMutation::start_load(active));
        return (effects, mutations);
    }

    if let Some(first) = state.sessions.first().map(|s| s.session_id.clone()) {
        let (select_effects, select_mutations) = select_session(state, &first);
        effects.extend(select_effects);
        mutations.extend(select_mutations);
    }
    (effects, mutations)
}

pub fn logout(state: &mut SessionState) -> Output {
    state.logout();
    debug!("logged out");
    (
        vec![UiEffect::ClearSnapshot],
        vec![
            StateMutation::reset_conversation(),
            StateMutation::notify(Notification::info(notifications::LOGGED_OUT)),
        ],
    )
}

pub fn add_session(state: &mut SessionState, session: Session) -> Vec<UiEffect> {
    let session_id = session.session_id.clone();
    if !state.add_session(session) {
        debug!(session_id, "session already known");
        return vec![];
    }
    vec![persist_user(state)]
}

pub fn remove_session(state: &mut SessionState, session_id: &str) -> Output {
    let Some(was_active) = state.remove_session(session_id) else {
        debug!(session_id, "remove of unknown session");
        return (vec![], vec![]);
    };

    let mut effects = vec![persist_user(state)];
    let mut mutations = Vec::new();
    if was_active {
        effects.push(persist_active_file(state));
        mutations.push(StateMutation::reset_conversation());
    }
    (effects, mutations)
}

/// Store-level pointer update. Rejected pointers change nothing.
pub fn set_active_file(state: &mut SessionState, file: Option<ActiveFile>) -> Vec<UiEffect> {
    let session_id = file.as_ref().map(|f| f.session_id.clone());
    if !state.set_active_file(file) {
        debug!(?session_id, "active file rejected: unknown session");
        return vec![];
    }
    vec![persist_active_file(state)]
}

pub fn select_session(state: &mut SessionState, session_id: &str) -> Output {
    let Some(session) = state.find(session_id) else {
        debug!(session_id, "select of unknown session");
        return (vec![], vec![]);
    };
    let file = ActiveFile::from_session(session);
    state.set_active_file(Some(file));

    (
        vec![persist_active_file(state)],
        vec![
            StateMutation::reset_conversation(),
            StateMutation::start_load(session_id),
        ],
    )
}

pub fn new_conversation(state: &mut SessionState) -> Result<Output, ClientError> {
    if !state.is_authenticated() {
        return Err(ClientError::auth_required(notifications::SIGN_IN_TO_MANAGE));
    }
    state.set_active_file(None);
    Ok((
        vec![persist_active_file(state)],
        vec![StateMutation::reset_conversation()],
    ))
}

pub fn request_delete(
    state: &SessionState,
    task: TaskId,
    session_id: &str,
) -> Result<UiEffect, ClientError> {
    let Some(user_id) = state.user_id() else {
        return Err(ClientError::auth_required(notifications::SIGN_IN_TO_MANAGE));
    };
    let session = state
        .find(session_id)
        .ok_or_else(|| ClientError::validation(format!("unknown session '{session_id}'")))?;
    if session.document.document_id.is_empty() {
        return Err(ClientError::validation("session has no document id"));
    }
    Ok(UiEffect::DeleteConversation {
        task,
        user_id: user_id.to_string(),
        session_id: session_id.to_string(),
        document_id: session.document.document_id.clone(),
    })
}

pub fn request_export(
    state: &SessionState,
    task: TaskId,
    session_id: &str,
) -> Result<UiEffect, ClientError> {
    if !state.is_authenticated() {
        return Err(ClientError::auth_required(notifications::SIGN_IN_TO_MANAGE));
    }
    if state.find(session_id).is_none() {
        return Err(ClientError::validation(format!(
            "unknown session '{session_id}'"
        )));
    }
    Ok(UiEffect::ExportConversation {
        task,
        session_id: session_id.to_string(),
    })
}

pub fn deleted(state: &mut SessionState, session_id: &str) -> Output {
    let (effects, mut mutations) = remove_session(state, session_id);
    mutations.push(StateMutation::notify(Notification::success(
        notifications::DELETED,
    )));
    (effects, mutations)
}

#[cfg(test)]
mod tests {
    use docqa_core::model::Document;

    use super::*;
    use crate::mutations::ConversationMutation;

    fn user() -> User {
        User {
            id: "u1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    fn session(id: &str) -> Session {
        Session {
            session_id: id.to_string(),
            created_at: String::new(),
            document: Document {
                document_id: format!("doc-{id}"),
                filename: format!("{id}.pdf"),
                file_url: String::new(),
                upload_time: None,
            },
        }
    }

    #[test]
    fn test_authenticated_activates_first_session() {
        let mut state = SessionState::default();
        let sessions = vec![session("s1"), session("s2")];
        let (effects, mutations) = authenticated(&mut state, user(), sessions);

        assert_eq!(state.active_session_id(), Some("s1"));
        assert!(matches!(effects[0], UiEffect::PersistUserSnapshot { .. }));
        assert!(matches!(
            effects.last(),
            Some(UiEffect::PersistActiveFile { active_file: Some(_) })
        ));
        assert!(mutations.iter().any(|m| matches!(
            m,
            StateMutation::Conversation(ConversationMutation::StartLoad { session_id })
                if session_id == "s1"
        )));
    }

    #[test]
    fn test_authenticated_without_sessions_leaves_nothing_active() {
        let mut state = SessionState::default();
        let (_, mutations) = authenticated(&mut state, user(), vec![]);
        assert_eq!(state.active_file, None);
        let starts_load = mutations.iter().any(|m| {
            matches!(
                m,
                StateMutation::Conversation(ConversationMutation::StartLoad { .. })
            )
        });
        assert!(!starts_load);
    }

    #[test]
    fn test_repeated_login_emits_nothing() {
        let mut state = SessionState::default();
        login(&mut state, user(), vec![session("s1")]);
        let (effects, mutations) = login(&mut state, user(), vec![session("s1")]);
        assert!(effects.is_empty());
        assert!(mutations.is_empty());
    }

    #[test]
    fn test_logout_clears_snapshot() {
        let mut state = SessionState::default();
        login(&mut state, user(), vec![session("s1")]);
        let (effects, _) = logout(&mut state);
        assert!(matches!(effects.as_slice(), [UiEffect::ClearSnapshot]));
        assert_eq!(state, SessionState::default());
    }

    #[test]
    fn test_select_unknown_session_is_ignored() {
        let mut state = SessionState::default();
        let (effects, mutations) = select_session(&mut state, "missing");
        assert!(effects.is_empty());
        assert!(mutations.is_empty());
    }

    #[test]
    fn test_new_conversation_requires_user() {
        let mut state = SessionState::default();
        let err = new_conversation(&mut state).unwrap_err();
        assert!(matches!(err, ClientError::AuthRequired(_)));
    }

    #[test]
    fn test_request_delete_uses_document_id() {
        let mut state = SessionState::default();
        login(&mut state, user(), vec![session("s1")]);
        let effect = request_delete(&state, TaskId(3), "s1").unwrap();
        match effect {
            UiEffect::DeleteConversation {
                user_id,
                document_id,
                ..
            } => {
                assert_eq!(user_id, "u1");
                assert_eq!(document_id, "doc-s1");
            }
            other => panic!("unexpected effect: {other:?}"),
        }
        assert!(matches!(
            request_delete(&state, TaskId(4), "nope"),
            Err(ClientError::Validation(_))
        ));
    }

    #[test]
    fn test_restore_with_orphan_rewrites_active_file_entry() {
        let mut state = SessionState::default();
        let restored = RestoredSnapshot {
            user: Some(user()),
            sessions: vec![session("s1")],
            active_file: Some(ActiveFile::from_session(&session("gone"))),
            discarded: vec![],
        };
        let effects = restore(&mut state, restored);
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::PersistActiveFile { active_file: None }]
        ));
    }
}
