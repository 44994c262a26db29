use std::sync::Arc;

use chrono::Utc;
use docqa_core::service::{DocumentService, UploadFile};

use crate::events::{UiEvent, UploadUiEvent};

/// Uploads a document and builds the session it created.
pub async fn upload_document<S: DocumentService>(
    service: Arc<S>,
    user_id: String,
    file: UploadFile,
) -> UiEvent {
    let file_name = file.file_name.clone();
    let result = service
        .upload_document(&user_id, file)
        .await
        .and_then(|response| response.into_session(&file_name, &Utc::now().to_rfc3339()));
    let event = match result {
        Ok(session) => UploadUiEvent::Uploaded { session },
        Err(error) => UploadUiEvent::Failed { error },
    };
    UiEvent::Upload(event)
}
