//! Upload coordination: one document at a time, each becoming a new session.

use docqa_core::model::ActiveFile;
use docqa_core::service::UploadFile;
use tracing::{debug, warn};

use crate::common::TaskState;
use crate::effects::UiEffect;
use crate::error::ClientError;
use crate::events::UploadUiEvent;
use crate::features::notifications::{self, Notification};
use crate::features::session::{self, SessionState};
use crate::mutations::StateMutation;

/// An accepted upload request.
#[derive(Debug)]
pub struct UploadRequest {
    pub user_id: String,
    pub file: UploadFile,
}

/// Validates an upload before any network call.
pub fn prepare_upload(
    session: &SessionState,
    task: &TaskState,
    file: Option<UploadFile>,
) -> Result<UploadRequest, ClientError> {
    let Some(user_id) = session.user_id() else {
        return Err(ClientError::auth_required(notifications::SIGN_IN_TO_UPLOAD));
    };
    let Some(file) = file else {
        return Err(ClientError::validation("no file selected"));
    };
    if file.file_name.trim().is_empty() {
        return Err(ClientError::validation("file has no name"));
    }
    if task.is_running() {
        return Err(ClientError::Busy(notifications::UPLOAD_IN_PROGRESS.to_string()));
    }
    Ok(UploadRequest {
        user_id: user_id.to_string(),
        file,
    })
}

pub fn handle_upload_event(
    state: &mut SessionState,
    event: UploadUiEvent,
) -> (Vec<UiEffect>, Vec<StateMutation>) {
    match event {
        UploadUiEvent::Uploaded { session: created } => {
            debug!(session_id = %created.session_id, "upload completed");
            let file = ActiveFile::from_session(&created);
            let mut effects = session::add_session(state, created);
            effects.extend(session::set_active_file(state, Some(file)));
            (
                effects,
                vec![
                    StateMutation::reset_conversation(),
                    StateMutation::notify(Notification::success(notifications::UPLOAD_SUCCEEDED)),
                ],
            )
        }
        UploadUiEvent::Failed { error } => {
            warn!(error = %error, "upload failed");
            let err = ClientError::Transport(error);
            let mutations = Notification::from_error(&err, notifications::UPLOAD_FAILED)
                .map(StateMutation::notify)
                .into_iter()
                .collect();
            (vec![], mutations)
        }
    }
}
