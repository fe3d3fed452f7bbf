//! Client-side favorites.
//!
//! An insertion-ordered set of listing identifiers kept in local storage
//! under [`keys::FAVORITES`] as a JSON array of strings. Nothing here talks
//! to the server; see [`ApiClient::toggle_favorite`](crate::api::ApiClient::toggle_favorite)
//! for the server-side flag.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use crate::storage::{SharedStore, StorageError, keys};

/// Favorites provider. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Favorites {
    inner: Arc<FavoritesInner>,
}

struct FavoritesInner {
    storage: SharedStore,
    /// `None` until first access.
    ids: RwLock<Option<Vec<String>>>,
}

impl Favorites {
    /// A provider over `storage`. Nothing is read until first use.
    #[must_use]
    pub fn new(storage: SharedStore) -> Self {
        Self {
            inner: Arc::new(FavoritesInner {
                storage,
                ids: RwLock::new(None),
            }),
        }
    }

    /// Load the stored list if that has not happened yet.
    ///
    /// A stored value that is not a JSON array of strings is deleted and the
    /// list starts empty.
    pub fn hydrate(&self) {
        let mut ids = self.inner.ids.write().unwrap_or_else(PoisonError::into_inner);
        if ids.is_none() {
            *ids = Some(self.load());
        }
    }

    /// Favorited identifiers, oldest first.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.hydrate();
        self.inner
            .ids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or_default()
    }

    /// Whether `id` is favorited.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.hydrate();
        self.inner
            .ids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|ids| ids.iter().any(|x| x == id))
    }

    /// Favorite `id`. Returns `false` if it already was.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be persisted. The in-memory list
    /// keeps the change.
    pub fn add(&self, id: &str) -> Result<bool, StorageError> {
        self.update(|ids| {
            if ids.iter().any(|x| x == id) {
                false
            } else {
                ids.push(id.to_string());
                true
            }
        })
    }

    /// Unfavorite `id`. Returns `false` if it was not favorited.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be persisted. The in-memory list
    /// keeps the change.
    pub fn remove(&self, id: &str) -> Result<bool, StorageError> {
        self.update(|ids| {
            let before = ids.len();
            ids.retain(|x| x != id);
            ids.len() != before
        })
    }

    /// Flip `id`. Returns whether it is favorited afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be persisted. The in-memory list
    /// keeps the change.
    pub fn toggle(&self, id: &str) -> Result<bool, StorageError> {
        let mut now_favorite = false;
        self.update(|ids| {
            if let Some(pos) = ids.iter().position(|x| x == id) {
                ids.remove(pos);
            } else {
                ids.push(id.to_string());
                now_favorite = true;
            }
            true
        })?;
        Ok(now_favorite)
    }

    /// Apply `change` and persist the whole list if it reports a change.
    fn update(&self, change: impl FnOnce(&mut Vec<String>) -> bool) -> Result<bool, StorageError> {
        let mut guard = self.inner.ids.write().unwrap_or_else(PoisonError::into_inner);
        let ids = guard.get_or_insert_with(|| self.load());

        if !change(ids) {
            return Ok(false);
        }

        let json = serde_json::to_string(ids)?;
        self.inner
            .storage
            .set(keys::FAVORITES, &json)
            .inspect_err(|e| warn!(error = %e, "could not persist favorites"))?;
        debug!(count = ids.len(), "favorites saved");
        Ok(true)
    }

    fn load(&self) -> Vec<String> {
        let raw = match self.inner.storage.get(keys::FAVORITES) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "could not read favorites");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(stored) => {
                let mut ids: Vec<String> = Vec::with_capacity(stored.len());
                for id in stored {
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
                debug!(count = ids.len(), "favorites loaded");
                ids
            }
            Err(e) => {
                warn!(error = %e, "stored favorites are corrupt, discarding");
                if let Err(e) = self.inner.storage.remove(keys::FAVORITES) {
                    warn!(error = %e, "could not remove corrupt favorites");
                }
                Vec::new()
            }
        }
    }
}

impl std::fmt::Debug for Favorites {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Favorites")
            .field("ids", &*self.inner.ids.read().unwrap_or_else(PoisonError::into_inner))
            .finish_non_exhaustive()
    }
}
