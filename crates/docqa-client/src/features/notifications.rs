//! Transient notifications shown to the user.

use std::collections::VecDeque;
use std::fmt;

use crate::error::ClientError;

pub const LOGGED_IN: &str = "Successfully logged in";
pub const LOGGED_OUT: &str = "Successfully logged out";
pub const SIGN_IN_TO_SEND: &str = "Please sign in to send messages";
pub const SIGN_IN_TO_UPLOAD: &str = "Please sign in to upload files";
pub const SIGN_IN_TO_MANAGE: &str = "Please sign in to manage conversations";
pub const UPLOAD_SUCCEEDED: &str = "File uploaded successfully!";
pub const UPLOAD_FAILED: &str = "Failed to upload file";
pub const UPLOAD_IN_PROGRESS: &str = "An upload is already in progress";
pub const SEND_FAILED: &str = "Failed to send message";
pub const LOAD_FAILED: &str = "Failed to load conversation";
pub const DELETED: &str = "Conversation deleted";
pub const DELETE_FAILED: &str = "Failed to delete conversation";
pub const EXPORT_FAILED: &str = "Failed to export conversation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Maps a client error to what the user sees. Validation failures are
    /// silent and map to `None`.
    pub fn from_error(err: &ClientError, fallback: &str) -> Option<Self> {
        match err {
            ClientError::AuthRequired(msg) | ClientError::Busy(msg) => {
                Some(Self::warning(msg.clone()))
            }
            ClientError::Validation(_) => None,
            ClientError::Transport(err) => Some(Self::error(err.user_message(fallback))),
            ClientError::MalformedPersistedState(_) => Some(Self::warning(fallback)),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}

/// FIFO of pending notifications. The front end drains it.
#[derive(Debug, Default, Clone)]
pub struct Notifications {
    queue: VecDeque<Notification>,
}

impl Notifications {
    pub fn push(&mut self, notification: Notification) {
        self.queue.push_back(notification);
    }

    pub fn drain(&mut self) -> Vec<Notification> {
        self.queue.drain(..).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.queue.iter()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
