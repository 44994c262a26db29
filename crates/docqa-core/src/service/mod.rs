//! Document service boundary.
//!
//! `DocumentService` is everything the client needs from the backend. The HTTP
//! implementation lives in [`http`]; tests substitute scripted fakes.

mod error;
pub mod http;

use std::future::Future;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub use error::{ServiceError, ServiceErrorKind, ServiceResult};
pub use http::HttpDocumentService;

use crate::model::{Document, Message, Sender, Session, User, string_or_number};

/// Identity claims presented to the service at sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub sub: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
}

/// Response to a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    pub user_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub sessions: Vec<Session>,
}

impl AuthResponse {
    pub fn user(&self) -> User {
        User {
            id: self.user_id.clone(),
            name: self.name.clone().unwrap_or_default(),
            email: self.email.clone(),
        }
    }
}

/// A document picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Reads a file from disk, keeping only its final path component as name.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("Not a file path: {}", path.display()))?;
        Ok(Self { file_name, bytes })
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Document part of an upload response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedDocument {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
}

/// Response to a successful upload.
///
/// The nested `document` form is preferred; the flat `file_id`/`s3_url` form is
/// accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadResponse {
    #[serde(deserialize_with = "string_or_number")]
    pub session_id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub document: Option<UploadedDocument>,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub file_id: Option<String>,
    #[serde(default)]
    pub s3_url: Option<String>,
}

impl UploadResponse {
    /// Builds the session for a freshly uploaded file.
    ///
    /// The local file name is used as the display filename, matching what the
    /// user picked rather than the service's storage key.
    pub fn into_session(self, local_file_name: &str, now: &str) -> ServiceResult<Session> {
        let (document_id, file_url) = match self.document {
            Some(doc) => (Some(doc.id), doc.file_url),
            None => (self.file_id, None),
        };
        let document_id = document_id
            .ok_or_else(|| ServiceError::parse("Upload response is missing a document id"))?;
        let file_url = file_url.or(self.s3_url).unwrap_or_default();

        Ok(Session {
            session_id: self.session_id,
            created_at: self.created_at.unwrap_or_else(|| now.to_string()),
            document: Document {
                document_id,
                filename: local_file_name.to_string(),
                file_url,
                upload_time: Some(now.to_string()),
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

/// One stored chat turn as returned by the history endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub role: String,
    pub content: String,
    #[serde(default)]
    pub timestamp: String,
}

impl From<HistoryRecord> for Message {
    fn from(record: HistoryRecord) -> Self {
        Message {
            id: record.id,
            content: record.content,
            sender: Sender::from_role(&record.role),
            timestamp: record.timestamp,
        }
    }
}

/// Remote document service used by the client.
///
/// Every call is one request; none of them retries.
pub trait DocumentService: Send + Sync + 'static {
    fn authenticate(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = ServiceResult<AuthResponse>> + Send;

    fn upload_document(
        &self,
        user_id: &str,
        file: UploadFile,
    ) -> impl Future<Output = ServiceResult<UploadResponse>> + Send;

    fn ask(
        &self,
        session_id: &str,
        question: &str,
    ) -> impl Future<Output = ServiceResult<AskResponse>> + Send;

    /// History in server order.
    fn get_history(
        &self,
        session_id: &str,
    ) -> impl Future<Output = ServiceResult<Vec<HistoryRecord>>> + Send;

    fn delete_conversation(
        &self,
        user_id: &str,
        document_id: &str,
    ) -> impl Future<Output = ServiceResult<()>> + Send;

    fn export_conversation_pdf(
        &self,
        session_id: &str,
    ) -> impl Future<Output = ServiceResult<Vec<u8>>> + Send;
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrap(#[serde(deserialize_with = "string_or_number")] String);

    Ok(Option::<Wrap>::deserialize(deserializer)?.map(|Wrap(s)| s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_response_nested_document() {
        let raw = r#"{
            "session_id": 12,
            "created_at": "2024-06-01T09:00:00",
            "document": {"id": 4, "file_url": "https://bucket/report.pdf"}
        }"#;
        let resp: UploadResponse = serde_json::from_str(raw).unwrap();
        let session = resp.into_session("report.pdf", "2024-06-01T09:00:01Z").unwrap();
        assert_eq!(session.session_id, "12");
        assert_eq!(session.created_at, "2024-06-01T09:00:00");
        assert_eq!(session.document.document_id, "4");
        assert_eq!(session.document.filename, "report.pdf");
        assert_eq!(session.document.file_url, "https://bucket/report.pdf");
    }

    #[test]
    fn test_upload_response_flat_form() {
        let raw = r#"{"session_id": 3, "file_id": 9, "filename": "abc", "s3_url": "https://s3/abc"}"#;
        let resp: UploadResponse = serde_json::from_str(raw).unwrap();
        let session = resp.into_session("notes.pdf", "now").unwrap();
        assert_eq!(session.document.document_id, "9");
        assert_eq!(session.document.file_url, "https://s3/abc");
        assert_eq!(session.created_at, "now");
    }

    #[test]
    fn test_upload_response_without_document_id_is_parse_error() {
        let raw = r#"{"session_id": 3}"#;
        let resp: UploadResponse = serde_json::from_str(raw).unwrap();
        let err = resp.into_session("x.pdf", "now").unwrap_err();
        assert_eq!(err.kind, ServiceErrorKind::Parse);
    }

    #[test]
    fn test_history_record_maps_role() {
        let raw = r#"[
            {"id": 1, "session_id": 5, "role": "user", "content": "hi", "timestamp": "t1"},
            {"id": 2, "session_id": 5, "role": "model", "content": "hello", "timestamp": "t2"}
        ]"#;
        let records: Vec<HistoryRecord> = serde_json::from_str(raw).unwrap();
        let messages: Vec<Message> = records.into_iter().map(Message::from).collect();
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[1].sender, Sender::Assistant);
        assert_eq!(messages[1].id, "2");
        assert_eq!(messages[1].timestamp, "t2");
    }

    #[test]
    fn test_auth_response_user_defaults_name() {
        let raw = r#"{"user_id": "g-1", "email": "a@b.c", "name": null, "sessions": []}"#;
        let resp: AuthResponse = serde_json::from_str(raw).unwrap();
        let user = resp.user();
        assert_eq!(user.id, "g-1");
        assert_eq!(user.name, "");
    }
}
