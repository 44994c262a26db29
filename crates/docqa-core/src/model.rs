//! Domain types shared by the service client, snapshot store and state manager.
//!
//! Field names follow the document service's JSON shape (`session_id`,
//! `file_url`, ...) so the same types serve the wire format and the persisted
//! snapshot.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// The authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// An uploaded document. Referenced by exactly one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "id", deserialize_with = "string_or_number")]
    pub document_id: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub file_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_time: Option<String>,
}

/// A document-scoped conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(deserialize_with = "string_or_number")]
    pub session_id: String,
    #[serde(default)]
    pub created_at: String,
    pub document: Document,
}

impl Session {
    /// Title shown in session lists: the filename without its extension.
    ///
    /// Falls back to `Conversation <created_at date>` when the document has no
    /// filename.
    pub fn title(&self) -> String {
        let filename = self.document.filename.trim();
        if filename.is_empty() {
            let date = self.created_at.split('T').next().unwrap_or_default();
            return format!("Conversation {date}").trim_end().to_string();
        }
        match filename.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => filename.to_string(),
        }
    }
}

/// Pointer to the session whose document is currently shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveFile {
    pub file_name: String,
    pub file_url: String,
    pub session_id: String,
    pub document_id: String,
}

impl ActiveFile {
    pub fn from_session(session: &Session) -> Self {
        Self {
            file_name: session.document.filename.clone(),
            file_url: session.document.file_url.clone(),
            session_id: session.session_id.clone(),
            document_id: session.document.document_id.clone(),
        }
    }
}

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    /// Maps a service role to a sender. Anything other than `user` is the assistant.
    pub fn from_role(role: &str) -> Self {
        if role == "user" {
            Sender::User
        } else {
            Sender::Assistant
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single chat turn as displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    pub timestamp: String,
}

/// Accepts ids the service sends as JSON numbers as well as strings.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
        Uint(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Int(n) => n.to_string(),
        Id::Uint(n) => n.to_string(),
    })
}
