//! API errors and server error-body normalization.
//!
//! The backend reports failures in several shapes:
//!
//! ```text
//! {"detail": "Invalid credentials"}
//! {"detail": [{"loc": ["body", "email"], "msg": "field required"}]}
//! {"detail": {"message": "Store not approved"}}
//! {"message": "Something went wrong"}
//! ```
//!
//! [`ErrorBody`] models that union and [`ErrorBody::message`] reduces it to a
//! single human-readable string.

use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::IgnoredAny;
use thiserror::Error;

/// Message used when the server gives no usable explanation.
pub const GENERIC_ERROR: &str = "Request failed";

/// Message used for a validation `detail` that carries no text.
pub const VALIDATION_ERROR: &str = "Validation error";

/// Errors that can occur when talking to the marketplace API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server could not be reached or the connection broke.
    #[error("Connection error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    ///
    /// `message` is the normalized server explanation.
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    /// A success body was not the JSON the caller asked for.
    #[error("Unexpected response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// A request body could not be encoded as JSON.
    #[error("Could not encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The endpoint does not form a valid URL with the base URL.
    #[error("Invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// A header name or value could not be sent.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

impl ApiError {
    /// The human-readable message shown to users.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status, when the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server rejected the request outright (as opposed to never
    /// seeing it or sending something unreadable back).
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Status { .. })
    }

    /// Build a [`ApiError::Status`] from a raw error response body.
    #[must_use]
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        Self::Status {
            status,
            message: message_from_body(body),
        }
    }
}

// =============================================================================
// Error bodies
// =============================================================================

/// A server error body.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<ErrorDetail>,
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}

/// The `detail` field of an error body.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    /// Plain explanation.
    Text(String),
    /// Validation errors, one per offending field.
    List(Vec<DetailEntry>),
    /// Structured explanation.
    Object(DetailItem),
    /// Anything else (numbers, booleans).
    Other(IgnoredAny),
}

/// One entry of a validation error list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DetailEntry {
    Item(DetailItem),
    Other(IgnoredAny),
}

/// An object carrying `msg` and/or `message`.
#[derive(Debug, Default, Deserialize)]
pub struct DetailItem {
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl DetailItem {
    fn text(&self) -> Option<&str> {
        non_empty(self.msg.as_deref()).or_else(|| non_empty(self.message.as_deref()))
    }
}

impl DetailEntry {
    fn text(&self) -> Option<&str> {
        match self {
            Self::Item(item) => item.text(),
            Self::Other(_) => None,
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

impl ErrorBody {
    /// Reduce the body to one message.
    ///
    /// A non-empty `detail` wins. A string is used as-is, a list yields its
    /// first entry's `msg`/`message` (or [`VALIDATION_ERROR`]), an object
    /// yields its own `msg`/`message`. Without a `detail`, a top-level string
    /// `message` is used. Everything else is [`GENERIC_ERROR`].
    #[must_use]
    pub fn message(&self) -> String {
        let detail = self
            .detail
            .as_ref()
            .filter(|d| !matches!(d, ErrorDetail::Text(t) if t.is_empty()));

        match detail {
            Some(ErrorDetail::Text(text)) => text.clone(),
            Some(ErrorDetail::List(entries)) => entries
                .first()
                .and_then(DetailEntry::text)
                .unwrap_or(VALIDATION_ERROR)
                .to_string(),
            Some(ErrorDetail::Object(item)) => item.text().unwrap_or(GENERIC_ERROR).to_string(),
            Some(ErrorDetail::Other(_)) => GENERIC_ERROR.to_string(),
            None => self
                .message
                .as_ref()
                .and_then(serde_json::Value::as_str)
                .and_then(|m| non_empty(Some(m)))
                .unwrap_or(GENERIC_ERROR)
                .to_string(),
        }
    }
}

/// Normalize a raw error response body to one message.
///
/// Bodies that are not JSON objects (HTML error pages, empty bodies) yield
/// [`GENERIC_ERROR`].
#[must_use]
pub fn message_from_body(body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .map_or_else(|_| GENERIC_ERROR.to_string(), |parsed| parsed.message())
}
