//! Error types for casenote.
//!
//! Two layers live here:
//!
//! 1. [`Error`] — the crate-level error enum used with `?` inside the
//!    fetch/aggregation code paths.
//! 2. [`SourceError`] and [`NoteError`] — data-level failure records that
//!    travel *inside* results. A failed summary fetch becomes a
//!    [`SourceError`] attached to its collection; a failed detail fetch
//!    becomes a [`NoteError`] embedded in the offending note. Neither ever
//!    propagates as a crate-level error past the aggregation boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using casenote's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for casenote operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Remote call exceeded its bounded timeout
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Response body was not valid structured data
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authentication failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not authorized
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Timeout(e.to_string())
        } else {
            Error::Request(e.to_string())
        }
    }
}

// =============================================================================
// SOURCE-LEVEL ERRORS
// =============================================================================

/// Category of a failed summary fetch for one source.
///
/// The numeric categories mirror the record-keeping service's view API;
/// `Network` and `Parse` cover transport failures and malformed bodies,
/// which carry no HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceErrorKind {
    /// 400 — the requested view does not exist
    BadRequest,
    /// 401 — could not authenticate the user
    Unauthorized,
    /// 403 — missing permissions
    Forbidden,
    /// 408 — view processing took too long and was canceled upstream
    Timeout,
    /// Any other non-success status
    Unknown,
    /// Transport-level failure (connection refused, DNS, local timeout)
    Network,
    /// Response body was not valid structured data
    Parse,
}

impl SourceErrorKind {
    /// Map an HTTP status to its category.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            408 => Self::Timeout,
            _ => Self::Unknown,
        }
    }
}

/// A source-level failure: the summary fetch for one source did not
/// produce a note list.
///
/// Attached to the [`CaseNoteCollection`](crate::models::CaseNoteCollection)
/// whose fetch failed; the collection's note list is empty in that case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceError {
    pub kind: SourceErrorKind,
    /// HTTP status, when the failure was a non-success response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
}

impl SourceError {
    /// Build from a non-success HTTP status, using the fixed message
    /// template for that category.
    pub fn from_status(status: u16) -> Self {
        let kind = SourceErrorKind::from_status(status);
        let message = match kind {
            SourceErrorKind::BadRequest => {
                "Bad Request: The requested view does not exist.".to_string()
            }
            SourceErrorKind::Unauthorized => {
                "Unauthorized: Could not authenticate the user.".to_string()
            }
            SourceErrorKind::Forbidden => {
                "Forbidden: You do not have the required permissions.".to_string()
            }
            SourceErrorKind::Timeout => {
                "Request Timeout: View processing took too long and was canceled.".to_string()
            }
            _ => format!("Error: {}", status),
        };
        Self {
            kind,
            status: Some(status),
            message,
        }
    }

    /// Build from a transport-level failure.
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Network,
            status: None,
            message: format!("Network error: {}", message.into()),
        }
    }

    /// Build from a malformed response body.
    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Parse,
            status: None,
            message: format!("Failed to parse response data: {}", message.into()),
        }
    }
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<&Error> for SourceError {
    fn from(e: &Error) -> Self {
        match e {
            Error::Parse(msg) => SourceError::parse(msg.clone()),
            Error::Timeout(msg) => Self {
                kind: SourceErrorKind::Network,
                status: None,
                message: format!("Network error: {}", msg),
            },
            other => SourceError::network(other.to_string()),
        }
    }
}

// =============================================================================
// NOTE-LEVEL ERRORS
// =============================================================================

/// A note-level failure: detail enrichment for one note did not produce
/// case data.
///
/// Embedded in the offending [`EnrichedNote`](crate::models::EnrichedNote);
/// never terminates the batch it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteError {
    /// The offending composition id, when the summary carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composition_id: Option<String>,
    pub cause: String,
}

impl NoteError {
    /// The summary carried no composition id; enrichment was never attempted.
    pub fn missing_id() -> Self {
        Self {
            composition_id: None,
            cause: "Missing composition id".to_string(),
        }
    }

    /// The detail endpoint returned a non-success status.
    pub fn detail_status(composition_id: &str, status: u16) -> Self {
        Self {
            composition_id: Some(composition_id.to_string()),
            cause: format!(
                "Failed to fetch detail for composition {}: status {}",
                composition_id, status
            ),
        }
    }

    /// The detail fetch failed at the transport level.
    pub fn transport(composition_id: &str, cause: impl Into<String>) -> Self {
        Self {
            composition_id: Some(composition_id.to_string()),
            cause: format!(
                "Error fetching detail for composition {}: {}",
                composition_id,
                cause.into()
            ),
        }
    }
}

impl std::fmt::Display for NoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.cause)
    }
}
