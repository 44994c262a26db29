use std::fmt;

use docqa_core::service::ServiceError;

/// Errors surfaced by client operations.
///
/// None of them are fatal: the reducer turns them into notifications, or
/// drops them silently for validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The operation needs a signed-in user. Carries the user-facing prompt.
    AuthRequired(String),
    /// Input rejected before any network call.
    Validation(String),
    /// A single-flight operation is already running. Carries the user-facing
    /// message.
    Busy(String),
    /// The document service call failed.
    Transport(ServiceError),
    /// A persisted snapshot entry could not be read and was discarded.
    MalformedPersistedState(String),
}

impl ClientError {
    pub fn auth_required(message: impl Into<String>) -> Self {
        ClientError::AuthRequired(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation(message.into())
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::AuthRequired(msg) => write!(f, "{msg}"),
            ClientError::Validation(msg) => write!(f, "invalid input: {msg}"),
            ClientError::Busy(msg) => write!(f, "{msg}"),
            ClientError::Transport(err) => write!(f, "service error: {err}"),
            ClientError::MalformedPersistedState(key) => {
                write!(f, "discarded malformed persisted state '{key}'")
            }
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ServiceError> for ClientError {
    fn from(err: ServiceError) -> Self {
        ClientError::Transport(err)
    }
}
