//! Client reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use chrono::Utc;
use docqa_core::model::User;
use tracing::{debug, warn};

use crate::common::TaskKind;
use crate::effects::UiEffect;
use crate::error::ClientError;
use crate::events::{SessionUiEvent, UiEvent};
use crate::features::notifications::{self, Notification};
use crate::features::{conversation, session, upload};
use crate::mutations::{ConversationMutation, StateMutation};
use crate::state::{AppState, ExportedConversation};

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns effects
/// for the runtime to execute.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Restore(restored) => session::restore(&mut app.session, restored),

        UiEvent::Authenticate { credential } => {
            if app.tasks.authenticate.is_running() {
                debug!("authentication already in flight");
                return vec![];
            }
            let task = app.task_seq.next_id();
            app.tasks.authenticate.start(task);
            vec![UiEffect::Authenticate { task, credential }]
        }
        UiEvent::Login { user, sessions } => {
            let mut effects = cancel_if_other_account(app, &user);
            let (login_effects, mutations) = session::login(&mut app.session, user, sessions);
            effects.extend(login_effects);
            finish(app, effects, mutations)
        }
        UiEvent::Logout => {
            let mut effects = cancel_all(app);
            let (logout_effects, mutations) = session::logout(&mut app.session);
            effects.extend(logout_effects);
            app.exported = None;
            finish(app, effects, mutations)
        }
        UiEvent::AddSession(new_session) => session::add_session(&mut app.session, new_session),
        UiEvent::RemoveSession { session_id } => {
            let (effects, mutations) = session::remove_session(&mut app.session, &session_id);
            finish(app, effects, mutations)
        }
        UiEvent::SetActiveFile(file) => session::set_active_file(&mut app.session, file),
        UiEvent::SelectSession { session_id } => {
            let (effects, mutations) = session::select_session(&mut app.session, &session_id);
            finish(app, effects, mutations)
        }
        UiEvent::NewConversation => match session::new_conversation(&mut app.session) {
            Ok((effects, mutations)) => finish(app, effects, mutations),
            Err(err) => reject(app, &err, notifications::SIGN_IN_TO_MANAGE),
        },
        UiEvent::LoadConversation { session_id } => load_conversation(app, session_id),

        UiEvent::InputChanged(text) => {
            app.conversation.input = text;
            vec![]
        }
        UiEvent::SubmitInput => submit_input(app),

        UiEvent::UploadFile { file } => {
            match upload::prepare_upload(&app.session, &app.tasks.upload, file) {
                Ok(request) => {
                    let task = app.task_seq.next_id();
                    app.tasks.upload.start(task);
                    vec![UiEffect::Upload {
                        task,
                        user_id: request.user_id,
                        file: request.file,
                    }]
                }
                Err(err) => reject(app, &err, notifications::UPLOAD_FAILED),
            }
        }
        UiEvent::DeleteConversation { session_id } => {
            if app.tasks.delete.is_running() {
                debug!(session_id, "delete already in flight");
                return vec![];
            }
            let task = app.task_seq.next_id();
            match session::request_delete(&app.session, task, &session_id) {
                Ok(effect) => {
                    app.tasks.delete.start(task);
                    vec![effect]
                }
                Err(err) => reject(app, &err, notifications::DELETE_FAILED),
            }
        }
        UiEvent::ExportConversation { session_id } => {
            if app.tasks.export.is_running() {
                debug!(session_id, "export already in flight");
                return vec![];
            }
            let task = app.task_seq.next_id();
            match session::request_export(&app.session, task, &session_id) {
                Ok(effect) => {
                    app.tasks.export.start(task);
                    vec![effect]
                }
                Err(err) => reject(app, &err, notifications::EXPORT_FAILED),
            }
        }

        UiEvent::TaskStarted { kind, started } => {
            if !app.tasks.state_mut(kind).on_started(&started) {
                debug!(?kind, id = started.id.0, "task started after being superseded");
            }
            vec![]
        }
        UiEvent::TaskCompleted { kind, completed } => {
            if app.tasks.state_mut(kind).finish_if_active(completed.id) {
                update(app, *completed.result)
            } else {
                debug!(?kind, id = completed.id.0, "discarding stale task result");
                vec![]
            }
        }
        UiEvent::TaskCancelled { kind, id } => {
            app.tasks.state_mut(kind).finish_if_active(id);
            debug!(?kind, id = id.0, "task cancelled");
            vec![]
        }

        UiEvent::Session(event) => handle_session_event(app, event),
        UiEvent::Conversation(event) => {
            let mutations = conversation::handle_conversation_event(
                &mut app.conversation,
                &app.session,
                event,
                Utc::now(),
            );
            finish(app, vec![], mutations)
        }
        UiEvent::Upload(event) => {
            let (effects, mutations) = upload::handle_upload_event(&mut app.session, event);
            finish(app, effects, mutations)
        }
    }
}

fn handle_session_event(app: &mut AppState, event: SessionUiEvent) -> Vec<UiEffect> {
    match event {
        SessionUiEvent::Authenticated { user, sessions } => {
            let mut effects = cancel_if_other_account(app, &user);
            let (login_effects, mutations) =
                session::authenticated(&mut app.session, user, sessions);
            effects.extend(login_effects);
            finish(app, effects, mutations)
        }
        SessionUiEvent::AuthenticateFailed { error } => {
            let detail = error.user_message(&error.message);
            app.notifications
                .push(Notification::error(format!("Login failed: {detail}")));
            vec![]
        }
        SessionUiEvent::Deleted { session_id } => {
            let (effects, mutations) = session::deleted(&mut app.session, &session_id);
            finish(app, effects, mutations)
        }
        SessionUiEvent::DeleteFailed { session_id, error } => {
            warn!(session_id, error = %error, "delete failed");
            app.notifications
                .push(Notification::error(notifications::DELETE_FAILED));
            vec![]
        }
        SessionUiEvent::Exported { session_id, bytes } => {
            debug!(session_id, size = bytes.len(), "conversation exported");
            app.exported = Some(ExportedConversation { session_id, bytes });
            vec![]
        }
        SessionUiEvent::ExportFailed { session_id, error } => {
            warn!(session_id, error = %error, "export failed");
            app.notifications
                .push(Notification::error(notifications::EXPORT_FAILED));
            vec![]
        }
    }
}

fn submit_input(app: &mut AppState) -> Vec<UiEffect> {
    match conversation::prepare_dispatch(&app.session, &app.conversation) {
        Ok(dispatch) => {
            let task = app.task_seq.next_id();
            app.tasks.ask.start(task);
            app.conversation
                .begin_dispatch(dispatch.question.clone(), Utc::now());
            vec![UiEffect::Ask {
                task,
                session_id: dispatch.session_id,
                question: dispatch.question,
            }]
        }
        Err(err) => reject(app, &err, notifications::SEND_FAILED),
    }
}

/// The loader entry point. `None` clears the list; an id must name the active
/// session, since the list only ever shows the active conversation.
fn load_conversation(app: &mut AppState, session_id: Option<String>) -> Vec<UiEffect> {
    let Some(session_id) = session_id else {
        return finish(app, vec![], vec![StateMutation::reset_conversation()]);
    };
    if !app.session.is_active(&session_id) {
        debug!(session_id, "load requested for inactive session");
        return vec![];
    }
    finish(app, vec![], vec![StateMutation::start_load(session_id)])
}

/// Turns a rejected command into its notification, if it has one.
fn reject(app: &mut AppState, err: &ClientError, fallback: &str) -> Vec<UiEffect> {
    match Notification::from_error(err, fallback) {
        Some(notification) => app.notifications.push(notification),
        None => debug!(error = %err, "command ignored"),
    }
    vec![]
}

/// Signing in as a different account drops everything still in flight and
/// any export waiting for pickup.
fn cancel_if_other_account(app: &mut AppState, user: &User) -> Vec<UiEffect> {
    match app.session.user_id() {
        Some(current) if current != user.id => {
            app.exported = None;
            cancel_all(app)
        }
        _ => vec![],
    }
}

fn cancel_all(app: &mut AppState) -> Vec<UiEffect> {
    TaskKind::ALL
        .into_iter()
        .filter_map(|kind| cancel_task(app, kind))
        .collect()
}

fn cancel_task(app: &mut AppState, kind: TaskKind) -> Option<UiEffect> {
    let state = app.tasks.state_mut(kind);
    if !state.is_running() {
        return None;
    }
    let token = state.clear();
    Some(UiEffect::CancelTask { kind, token })
}

fn finish(
    app: &mut AppState,
    mut effects: Vec<UiEffect>,
    mutations: Vec<StateMutation>,
) -> Vec<UiEffect> {
    effects.extend(apply_mutations(app, mutations));
    effects
}

/// Applies cross-slice mutations in order, returning the effects they imply.
fn apply_mutations(app: &mut AppState, mutations: Vec<StateMutation>) -> Vec<UiEffect> {
    let mut effects = Vec::new();
    for mutation in mutations {
        match mutation {
            StateMutation::Notify(notification) => app.notifications.push(notification),
            StateMutation::Conversation(ConversationMutation::Reset) => {
                app.conversation.reset();
                effects.extend(cancel_task(app, TaskKind::ConversationLoad));
                effects.extend(cancel_task(app, TaskKind::Ask));
            }
            StateMutation::Conversation(ConversationMutation::StartLoad { session_id }) => {
                effects.extend(cancel_task(app, TaskKind::ConversationLoad));
                let task = app.task_seq.next_id();
                app.tasks.conversation_load.start(task);
                effects.push(UiEffect::LoadConversation { task, session_id });
            }
        }
    }
    effects
}
