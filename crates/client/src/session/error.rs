//! Session errors.

use thiserror::Error;

use crate::api::ApiError;
use crate::storage::StorageError;

/// Errors that can occur while establishing or refreshing a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The API call failed; the message is the server's.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The server accepted the login but sent no access token.
    #[error("Login failed")]
    MissingToken,

    /// The token could not be persisted.
    #[error("Could not save session: {0}")]
    Storage(#[from] StorageError),

    /// A logout or a newer refresh happened while this call was in flight,
    /// so its result was dropped.
    #[error("Session changed while the request was in flight")]
    Superseded,
}

impl SessionError {
    /// The human-readable message shown to users.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}
