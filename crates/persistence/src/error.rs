//! Errors raised while talking to the database service.

use serde::Deserialize;
use thiserror::Error;

/// PostgreSQL unique violation.
pub const SQLSTATE_UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL foreign key violation.
pub const SQLSTATE_FOREIGN_KEY_VIOLATION: &str = "23503";
/// PostgreSQL not null violation.
pub const SQLSTATE_NOT_NULL_VIOLATION: &str = "23502";
/// PostgreSQL invalid text representation (bad uuid, bad enum value).
pub const SQLSTATE_INVALID_TEXT: &str = "22P02";

/// Errors returned by the PostgREST and Storage clients.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned {status}: {message}")]
    Status {
        status: u16,
        code: Option<String>,
        message: String,
        details: Option<String>,
        hint: Option<String>,
    },

    #[error("failed to decode upstream response: {0}")]
    Decode(String),

    #[error("storage returned {status}: {message}")]
    Storage { status: u16, message: String },
}

/// Error body returned by PostgREST.
#[derive(Debug, Default, Deserialize)]
struct PostgrestErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<serde_json::Value>,
    hint: Option<serde_json::Value>,
}

/// Error body returned by Storage.
#[derive(Debug, Default, Deserialize)]
struct StorageErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn value_to_text(value: Option<serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

impl UpstreamError {
    /// Builds a `Status` error from a non-2xx PostgREST response body.
    pub fn from_postgrest(status: u16, body: &[u8]) -> Self {
        match serde_json::from_slice::<PostgrestErrorBody>(body) {
            Ok(parsed) => UpstreamError::Status {
                status,
                code: parsed.code,
                message: parsed
                    .message
                    .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned()),
                details: value_to_text(parsed.details),
                hint: value_to_text(parsed.hint),
            },
            Err(_) => UpstreamError::Status {
                status,
                code: None,
                message: String::from_utf8_lossy(body).into_owned(),
                details: None,
                hint: None,
            },
        }
    }

    /// Builds a `Storage` error from a non-2xx Storage response body.
    pub fn from_storage(status: u16, body: &[u8]) -> Self {
        let parsed: StorageErrorBody = serde_json::from_slice(body).unwrap_or_default();
        let message = parsed
            .message
            .or(parsed.error)
            .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned());
        UpstreamError::Storage { status, message }
    }

    /// HTTP status returned by the upstream, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } | UpstreamError::Storage { status, .. } => {
                Some(*status)
            }
            UpstreamError::Http(e) => e.status().map(|s| s.as_u16()),
            UpstreamError::Decode(_) => None,
        }
    }

    /// SQLSTATE or PostgREST error code, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            UpstreamError::Status { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    fn message_contains(&self, needle: &str) -> bool {
        match self {
            UpstreamError::Status {
                message, details, ..
            } => {
                message.contains(needle)
                    || details.as_deref().is_some_and(|d| d.contains(needle))
            }
            UpstreamError::Storage { message, .. } => message.contains(needle),
            _ => false,
        }
    }

    /// Unique constraint violation.
    pub fn is_duplicate_key(&self) -> bool {
        self.code() == Some(SQLSTATE_UNIQUE_VIOLATION)
            || self.message_contains("duplicate key")
            || matches!(self, UpstreamError::Storage { status: 409, .. })
    }

    /// Foreign key violation: a referenced row does not exist.
    pub fn is_foreign_key_violation(&self) -> bool {
        self.code() == Some(SQLSTATE_FOREIGN_KEY_VIOLATION)
    }

    /// Rejected input: missing column value, malformed value or a request
    /// PostgREST could not parse (`PGRST1xx`).
    pub fn is_invalid_input(&self) -> bool {
        match self.code() {
            Some(SQLSTATE_NOT_NULL_VIOLATION) | Some(SQLSTATE_INVALID_TEXT) => true,
            Some(code) => code.starts_with("PGRST1"),
            None => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Network failure or timeout before a response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, UpstreamError::Http(e) if e.status().is_none())
    }
}
