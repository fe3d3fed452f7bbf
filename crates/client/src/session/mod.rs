//! Authentication session.
//!
//! [`Session`] owns "who is signed in". It moves through
//!
//! ```text
//! Uninitialized -> Loading -> Authenticated(User)
//!                          -> Anonymous
//! ```
//!
//! and publishes every transition on a `tokio::sync::watch` channel, so any
//! number of observers can follow along with [`Session::subscribe`].
//!
//! # Stale responses
//!
//! Profile fetches can overlap with each other and with a logout. Each
//! refresh takes a sequence number and each logout bumps a generation
//! counter; a profile is applied only if neither moved while it was in
//! flight. Dropped results come back as [`SessionError::Superseded`]. The
//! same generation check keeps a login that completes after a logout from
//! storing its token.
//!
//! Each check and the state change it guards run under one commit lock,
//! which `logout` also takes, so a logout cannot land between them. The lock
//! is never held across an `.await`.

mod error;

pub use error::SessionError;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use luxtime_core::{LoginCredentials, NewUser, User};
use secrecy::SecretString;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::api::ApiClient;

/// Where the session stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// [`Session::restore`] has not run yet.
    #[default]
    Uninitialized,
    /// A profile fetch is in flight.
    Loading,
    /// Signed in as this user.
    Authenticated(User),
    /// Nobody is signed in.
    Anonymous,
}

impl SessionState {
    /// The signed-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// True until the first restore settles, and while a refresh runs.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Uninitialized | Self::Loading)
    }
}

/// Session provider. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    api: ApiClient,
    state: watch::Sender<SessionState>,
    generation: AtomicU64,
    refresh_seq: AtomicU64,
    commit: Mutex<()>,
}

impl Session {
    /// A session over `api`, in [`SessionState::Uninitialized`].
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let (state, _) = watch::channel(SessionState::Uninitialized);
        Self {
            inner: Arc::new(SessionInner {
                api,
                state,
                generation: AtomicU64::new(0),
                refresh_seq: AtomicU64::new(0),
                commit: Mutex::new(()),
            }),
        }
    }

    /// The API client this session authenticates.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.inner.state.borrow().user().cloned()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading()
    }

    /// Follow state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Resume a persisted session, if there is one.
    ///
    /// With a stored token the profile is fetched; without one the session
    /// goes straight to [`SessionState::Anonymous`]. Failures are reflected
    /// in the returned state rather than as an error.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> SessionState {
        if !self.inner.api.has_token() {
            debug!("no stored token");
            self.set_state(SessionState::Anonymous);
            return self.state();
        }

        if let Err(e) = self.refresh().await {
            debug!(error = %e, "stored session not restored");
        }
        self.state()
    }

    /// Re-fetch the profile for the current token.
    ///
    /// If the server rejects the token, the token is cleared. Either way a
    /// failed refresh leaves the session [`SessionState::Anonymous`].
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Api` if the profile could not be fetched.
    /// Returns `SessionError::Superseded` if a logout or another refresh
    /// started meanwhile; the state is then left to that newer operation.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<User, SessionError> {
        let generation = self.inner.generation.load(Ordering::SeqCst);
        self.refresh_in(generation).await
    }

    /// Refresh on behalf of an operation that started in `generation`.
    async fn refresh_in(&self, generation: u64) -> Result<User, SessionError> {
        let seq = {
            let _commit = self.lock_commit();
            if self.inner.generation.load(Ordering::SeqCst) != generation {
                return Err(SessionError::Superseded);
            }
            self.set_state(SessionState::Loading);
            self.inner.refresh_seq.fetch_add(1, Ordering::SeqCst) + 1
        };

        let result = self.inner.api.profile().await;

        let _commit = self.lock_commit();
        if !self.is_current(generation, seq) {
            debug!(seq, "discarding stale profile response");
            return Err(SessionError::Superseded);
        }

        match result {
            Ok(user) => {
                debug!(user_id = %user.id, role = %user.role, "session authenticated");
                self.set_state(SessionState::Authenticated(user.clone()));
                Ok(user)
            }
            Err(e) => {
                if e.is_rejection() {
                    warn!(error = %e, "token rejected, clearing session");
                    self.inner.api.clear_token();
                } else {
                    warn!(error = %e, "could not reach the API to refresh the session");
                }
                self.set_state(SessionState::Anonymous);
                Err(e.into())
            }
        }
    }

    /// Log in and load the profile.
    ///
    /// A rejected login leaves the session untouched.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Api` with the server's message if the login is
    /// rejected, `SessionError::MissingToken` if the server sent no token,
    /// `SessionError::Storage` if the token cannot be saved, and
    /// `SessionError::Superseded` if a logout happened meanwhile.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<User, SessionError> {
        let generation = self.inner.generation.load(Ordering::SeqCst);

        let response = self
            .inner
            .api
            .login(&credentials.email, &credentials.password)
            .await?;

        {
            let _commit = self.lock_commit();
            if self.inner.generation.load(Ordering::SeqCst) != generation {
                debug!("discarding login response that arrived after logout");
                return Err(SessionError::Superseded);
            }

            let token = response
                .access_token
                .filter(|t| !t.is_empty())
                .ok_or(SessionError::MissingToken)?;
            self.inner.api.set_token(SecretString::from(token))?;
        }

        let user = self.refresh_in(generation).await?;
        info!(user_id = %user.id, "logged in");
        Ok(user)
    }

    /// Create an account and log into it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Api` if registration is rejected. If the
    /// account was created but the automatic login fails, that login error
    /// is returned and the session stays anonymous.
    #[instrument(skip(self, new_user), fields(email = %new_user.email))]
    pub async fn register(&self, new_user: &NewUser) -> Result<User, SessionError> {
        let created = self.inner.api.register(new_user).await?;
        debug!(user_id = %created.id, "account created, logging in");
        self.login(&new_user.credentials()).await
    }

    /// Sign out. Takes effect immediately; in-flight refreshes and logins
    /// are discarded when they complete.
    #[instrument(skip(self))]
    pub fn logout(&self) {
        let _commit = self.lock_commit();
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.api.clear_token();
        self.set_state(SessionState::Anonymous);
        info!("logged out");
    }

    fn lock_commit(&self) -> MutexGuard<'_, ()> {
        self.inner.commit.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, generation: u64, seq: u64) -> bool {
        self.inner.generation.load(Ordering::SeqCst) == generation
            && self.inner.refresh_seq.load(Ordering::SeqCst) == seq
    }

    fn set_state(&self, state: SessionState) {
        self.inner.state.send_replace(state);
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &*self.inner.state.borrow())
            .field("generation", &self.inner.generation.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use url::Url;

    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore, keys};

    /// Nothing listens on port 1, so every request fails at the transport.
    fn unreachable_session(storage: Arc<MemoryStore>) -> Session {
        let api =
            ApiClient::with_base_url(Url::parse("http://127.0.0.1:1").unwrap(), storage).unwrap();
        Session::new(api)
    }

    #[test]
    fn test_starts_uninitialized() {
        let session = unreachable_session(Arc::new(MemoryStore::new()));
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(session.is_loading());
        assert!(session.user().is_none());
    }

    #[tokio::test]
    async fn test_restore_without_token_is_anonymous() {
        let session = unreachable_session(Arc::new(MemoryStore::new()));
        let mut rx = session.subscribe();

        assert_eq!(session.restore().await, SessionState::Anonymous);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_unreachable_api_keeps_stored_token() {
        let storage = Arc::new(MemoryStore::with_entries([(keys::ACCESS_TOKEN, "T")]));
        let session = unreachable_session(storage.clone());

        let state = session.restore().await;

        assert_eq!(state, SessionState::Anonymous);
        assert!(session.api().has_token());
        assert_eq!(storage.get(keys::ACCESS_TOKEN).unwrap().as_deref(), Some("T"));
    }

    #[tokio::test]
    async fn test_logout_clears_token_and_state() {
        let storage = Arc::new(MemoryStore::with_entries([(keys::ACCESS_TOKEN, "T")]));
        let session = unreachable_session(storage.clone());

        session.logout();

        assert_eq!(session.state(), SessionState::Anonymous);
        assert!(!session.api().has_token());
        assert_eq!(storage.get(keys::ACCESS_TOKEN).unwrap(), None);
    }

    #[tokio::test]
    async fn test_refresh_started_before_logout_is_superseded() {
        let storage = Arc::new(MemoryStore::with_entries([(keys::ACCESS_TOKEN, "T")]));
        let session = unreachable_session(storage.clone());
        let generation = session.inner.generation.load(Ordering::SeqCst);

        session.logout();
        let err = session.refresh_in(generation).await.unwrap_err();

        assert!(matches!(err, SessionError::Superseded));
        assert_eq!(session.state(), SessionState::Anonymous);
        assert_eq!(storage.get(keys::ACCESS_TOKEN).unwrap(), None);
    }

    #[tokio::test]
    async fn test_failed_login_leaves_state_alone() {
        let session = unreachable_session(Arc::new(MemoryStore::new()));
        let credentials = LoginCredentials::new(
            luxtime_core::Email::parse("a@b.com").unwrap(),
            SecretString::from("x"),
        );

        let err = session.login(&credentials).await.unwrap_err();

        assert!(matches!(err, SessionError::Api(crate::api::ApiError::Transport(_))));
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(!session.api().has_token());
    }
}
