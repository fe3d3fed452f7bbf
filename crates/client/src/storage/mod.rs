//! Durable client-side key-value storage.
//!
//! The session token and the favorites list survive restarts by living in a
//! small string-to-string store, the way a browser keeps them in
//! `localStorage`. Everything that persists goes through [`KeyValueStore`],
//! so tests can swap the file-backed store for [`MemoryStore`].

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Storage keys used by the client.
pub mod keys {
    /// Bearer token of the current session.
    pub const ACCESS_TOKEN: &str = "access_token";

    /// JSON array of favorited item identifiers.
    pub const FAVORITES: &str = "luxtime_favorites";
}

/// Errors raised by a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but is not a JSON object of strings.
    #[error("storage file {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be encoded for storage.
    #[error("could not encode value for storage: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A string key-value store with `localStorage` semantics.
///
/// Implementations are synchronous: writes complete before the call returns,
/// so a token set by one task is visible to the next request any task makes.
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be persisted. The previous value
    /// is kept in that case.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the deletion cannot be persisted.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Shared handle to a store.
pub type SharedStore = Arc<dyn KeyValueStore>;
