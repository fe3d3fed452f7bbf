//! Authentication endpoints.

use luxtime_core::{Balance, Email, NewUser, TokenResponse, User};
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use super::{ApiClient, ApiError, ApiRequest};

impl ApiClient {
    /// Exchange credentials for a token (`POST /auth/login`).
    ///
    /// The server expects an OAuth2 password form, so the email travels as
    /// `username`. The returned token is not stored; see
    /// [`Session::login`](crate::session::Session::login).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with the server's message (typically
    /// "Invalid credentials") if the login is rejected.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<TokenResponse, ApiError> {
        let request = ApiRequest::post("/auth/login").form([
            ("username", email.as_str()),
            ("password", password.expose_secret()),
        ]);
        self.send(request).await
    }

    /// Create an account (`POST /auth/register`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` if the server rejects the registration,
    /// e.g. because the email is taken.
    #[instrument(skip(self, new_user), fields(email = %new_user.email, role = %new_user.role))]
    pub async fn register(&self, new_user: &NewUser) -> Result<User, ApiError> {
        self.send(ApiRequest::post("/auth/register").json(new_user)?)
            .await
    }

    /// The account behind the current token (`GET /auth/profile`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` (401) if no token is held or the token was
    /// rejected.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<User, ApiError> {
        self.get("/auth/profile").await
    }

    /// Wallet balances of the current account (`GET /auth/balance`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or server failures.
    #[instrument(skip(self))]
    pub async fn balance(&self) -> Result<Balance, ApiError> {
        self.get("/auth/balance").await
    }
}
