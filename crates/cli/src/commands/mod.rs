//! Command implementations.
//!
//! Every command prints its result as pretty JSON on stdout and reports
//! failures through [`CommandError`].

pub mod admin;
pub mod auth;
pub mod favorites;
pub mod notifications;
pub mod watches;

use std::sync::Arc;

use luxtime_client::{
    ApiClient, ApiError, ClientConfig, Favorites, FileStore, Session, SessionError, StorageError,
};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Could not render output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not signed in. Run `luxtime login` first.")]
    NotSignedIn,
}

/// Everything a command needs, built once per invocation.
pub struct Context {
    pub api: ApiClient,
    pub session: Session,
    pub favorites: Favorites,
}

impl Context {
    /// Open storage and build the client stack from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage file is unreadable or the HTTP client
    /// cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, CommandError> {
        let storage = Arc::new(FileStore::open(&config.storage_path)?);
        tracing::debug!(path = %storage.path().display(), "using storage file");

        let api = ApiClient::new(&config, storage.clone())?;
        Ok(Self {
            session: Session::new(api.clone()),
            favorites: Favorites::new(storage),
            api,
        })
    }

    /// Restore the stored session and return the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::NotSignedIn` if there is no usable session.
    pub async fn require_user(&self) -> Result<luxtime_core::User, CommandError> {
        self.session
            .restore()
            .await
            .user()
            .cloned()
            .ok_or(CommandError::NotSignedIn)
    }
}

/// Print `value` as pretty JSON on stdout.
#[allow(clippy::print_stdout)]
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CommandError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
