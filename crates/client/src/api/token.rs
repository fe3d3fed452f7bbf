//! Bearer token cache backed by durable storage.

use std::fmt;
use std::sync::{PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::storage::{SharedStore, StorageError, keys};

/// The session's bearer token.
///
/// Mirrors the token in storage under [`keys::ACCESS_TOKEN`] so it survives
/// restarts. Reads never touch storage after construction.
pub struct TokenStore {
    token: RwLock<Option<SecretString>>,
    storage: SharedStore,
}

impl TokenStore {
    /// Load any persisted token from `storage`.
    ///
    /// An unreadable store is logged and treated as "no token".
    #[must_use]
    pub fn load(storage: SharedStore) -> Self {
        let token = match storage.get(keys::ACCESS_TOKEN) {
            Ok(token) => token.filter(|t| !t.is_empty()).map(SecretString::from),
            Err(e) => {
                warn!(error = %e, "could not read persisted token");
                None
            }
        };

        debug!(restored = token.is_some(), "token store loaded");

        Self {
            token: RwLock::new(token),
            storage,
        }
    }

    /// The current token, if any.
    #[must_use]
    pub fn get(&self) -> Option<SecretString> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a token is held.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Replace the token and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be persisted; the previous token
    /// stays in effect.
    pub fn set(&self, token: SecretString) -> Result<(), StorageError> {
        let mut slot = self.token.write().unwrap_or_else(PoisonError::into_inner);
        self.storage.set(keys::ACCESS_TOKEN, token.expose_secret())?;
        *slot = Some(token);
        Ok(())
    }

    /// Forget the token in memory and in storage.
    ///
    /// Failing to delete the persisted copy is logged; the in-memory token is
    /// gone either way.
    pub fn clear(&self) {
        let mut slot = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
        if let Err(e) = self.storage.remove(keys::ACCESS_TOKEN) {
            warn!(error = %e, "could not remove persisted token");
        }
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("token", &self.is_set().then_some("[REDACTED]"))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore};

    #[test]
    fn test_load_restores_persisted_token() {
        let storage = Arc::new(MemoryStore::with_entries([(keys::ACCESS_TOKEN, "T1")]));
        let tokens = TokenStore::load(storage);
        assert_eq!(tokens.get().unwrap().expose_secret(), "T1");
    }

    #[test]
    fn test_empty_persisted_token_is_ignored() {
        let storage = Arc::new(MemoryStore::with_entries([(keys::ACCESS_TOKEN, "")]));
        assert!(!TokenStore::load(storage).is_set());
    }

    #[test]
    fn test_set_and_clear_write_through() {
        let storage = Arc::new(MemoryStore::new());
        let tokens = TokenStore::load(storage.clone());

        tokens.set(SecretString::from("T2")).unwrap();
        assert_eq!(storage.get(keys::ACCESS_TOKEN).unwrap().as_deref(), Some("T2"));

        tokens.clear();
        assert!(!tokens.is_set());
        assert_eq!(storage.get(keys::ACCESS_TOKEN).unwrap(), None);
    }

    #[test]
    fn test_debug_redacts() {
        let storage = Arc::new(MemoryStore::new());
        let tokens = TokenStore::load(storage);
        tokens.set(SecretString::from("super-secret")).unwrap();
        assert!(!format!("{tokens:?}").contains("super-secret"));
    }
}
