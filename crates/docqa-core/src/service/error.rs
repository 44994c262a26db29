use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Categories of document service errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceErrorKind {
    /// HTTP status error (4xx, 5xx)
    HttpStatus,
    /// Connection timeout or request timeout
    Timeout,
    /// Connection refused, DNS failure, body read failure
    Transport,
    /// Response body did not match the expected shape
    Parse,
}

impl fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceErrorKind::HttpStatus => write!(f, "http_status"),
            ServiceErrorKind::Timeout => write!(f, "timeout"),
            ServiceErrorKind::Transport => write!(f, "transport"),
            ServiceErrorKind::Parse => write!(f, "parse"),
        }
    }
}

/// Structured error from the document service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceError {
    pub kind: ServiceErrorKind,
    /// One-line summary suitable for logs
    pub message: String,
    /// Message the service itself gave (FastAPI `detail`), if any
    pub detail: Option<String>,
}

impl ServiceError {
    pub fn new(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
        }
    }

    /// Creates an HTTP status error, pulling the service's own message out of
    /// the body when it is a JSON error document.
    pub fn http_status(status: u16, body: &str) -> Self {
        let detail = extract_detail(body);
        let message = match &detail {
            Some(detail) => format!("HTTP {status}: {detail}"),
            None => format!("HTTP {status}"),
        };
        Self {
            kind: ServiceErrorKind::HttpStatus,
            message,
            detail,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Timeout, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Transport, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Parse, message)
    }

    /// The most specific user-facing message, or `fallback` when the service
    /// did not say anything useful.
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map_or_else(|| fallback.to_string(), ToString::to_string)
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::timeout(format!("Request timed out: {err}"))
        } else if err.is_decode() {
            ServiceError::parse(format!("Invalid response body: {err}"))
        } else {
            ServiceError::transport(format!("Request failed: {err}"))
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ServiceError {}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Extracts `detail` (string or FastAPI validation list) or `error.message`.
fn extract_detail(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    match json.get("detail") {
        Some(Value::String(s)) => return Some(s.clone()),
        Some(Value::Array(items)) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if !msgs.is_empty() {
                return Some(msgs.join("; "));
            }
        }
        _ => {}
    }
    json.get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .map(ToString::to_string)
}
