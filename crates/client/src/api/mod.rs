//! HTTP client for the marketplace API.
//!
//! # Architecture
//!
//! - One [`ApiClient`] per process, built from [`ClientConfig`] and cloned
//!   into whatever needs it (session, favorites sync, CLI commands)
//! - Bearer token held in a [`TokenStore`] and persisted through the
//!   [`KeyValueStore`](crate::storage::KeyValueStore) it was built with
//! - Every request gets an `X-Request-Id` header and a sequence number on its
//!   tracing span, so log lines can be matched to server logs
//! - Failures are returned as [`ApiError`], never panics; there are no
//!   retries and no caching

pub mod admin;
pub mod auth;
pub mod error;
pub mod notifications;
pub mod token;
pub mod watches;

pub use error::{ApiError, GENERIC_ERROR, VALIDATION_ERROR};
pub use token::TokenStore;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::storage::{SharedStore, StorageError};

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

// =============================================================================
// Requests
// =============================================================================

/// Body of an outgoing request.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Sent as `application/json`.
    Json(serde_json::Value),
    /// Sent as `application/x-www-form-urlencoded`.
    Form(Vec<(String, String)>),
}

/// A request to an API endpoint.
///
/// `endpoint` is a path such as `/auth/profile`, appended to the base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    endpoint: String,
    body: RequestBody,
    headers: Vec<(String, String)>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            body: RequestBody::Empty,
            headers: Vec::new(),
        }
    }

    #[must_use]
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    #[must_use]
    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    #[must_use]
    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PUT, endpoint)
    }

    #[must_use]
    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::DELETE, endpoint)
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Encode`] if `body` cannot be represented as JSON.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        self.body = RequestBody::Json(serde_json::to_value(body).map_err(ApiError::Encode)?);
        Ok(self)
    }

    /// Attach a form-encoded body.
    #[must_use]
    pub fn form<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.body = RequestBody::Form(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Add or override a header. The `Authorization` header is always set
    /// from the token store and cannot be overridden.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

// =============================================================================
// Client
// =============================================================================

/// Marketplace API client.
///
/// Cheap to clone; all clones share the connection pool, token and request
/// counter.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenStore,
    sequence: AtomicU64,
}

impl ApiClient {
    /// Build a client from configuration.
    ///
    /// Any token already in `storage` is picked up, so a restarted process
    /// resumes its session.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be created
    /// (e.g. no TLS backend).
    pub fn new(config: &ClientConfig, storage: SharedStore) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        debug!(base_url = %config.api_url, "API client created");

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.base_url(),
                tokens: TokenStore::load(storage),
                sequence: AtomicU64::new(0),
            }),
        })
    }

    /// Build a client for `base_url` with default settings.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::new`].
    pub fn with_base_url(base_url: Url, storage: SharedStore) -> Result<Self, ApiError> {
        Self::new(&ClientConfig::new(base_url, ""), storage)
    }

    /// Base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Use `token` for subsequent requests and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be persisted.
    pub fn set_token(&self, token: SecretString) -> Result<(), StorageError> {
        self.inner.tokens.set(token)
    }

    /// Stop sending a token and forget the persisted one.
    pub fn clear_token(&self) {
        self.inner.tokens.clear();
    }

    /// Whether a token is currently held.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.inner.tokens.is_set()
    }

    // =========================================================================
    // Generic requests
    // =========================================================================

    /// `GET` an endpoint.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.send(ApiRequest::get(endpoint)).await
    }

    /// `POST` a JSON body (or nothing) to an endpoint.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn post<T, B>(&self, endpoint: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = ApiRequest::post(endpoint);
        if let Some(body) = body {
            request = request.json(body)?;
        }
        self.send(request).await
    }

    /// `PUT` a JSON body (or nothing) to an endpoint.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn put<T, B>(&self, endpoint: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = ApiRequest::put(endpoint);
        if let Some(body) = body {
            request = request.json(body)?;
        }
        self.send(request).await
    }

    /// `DELETE` an endpoint.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.send(ApiRequest::delete(endpoint)).await
    }

    /// Execute a request and decode the JSON response.
    ///
    /// An empty success body decodes as JSON `null`, so `()` and `Option<_>`
    /// work for endpoints that return nothing.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` on network failures.
    /// Returns `ApiError::Status` with the normalized server message on a
    /// non-success status.
    /// Returns `ApiError::Decode` if a success body is not the expected JSON.
    /// Returns `ApiError::InvalidEndpoint` / `ApiError::InvalidHeader` if the
    /// request cannot be built.
    #[instrument(
        skip(self, request),
        fields(
            method = %request.method,
            endpoint = %request.endpoint,
            seq = tracing::field::Empty,
            request_id = tracing::field::Empty,
        )
    )]
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let seq = self.inner.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let request_id = Uuid::new_v4();
        let span = tracing::Span::current();
        span.record("seq", seq);
        span.record("request_id", tracing::field::display(request_id));

        let url = self.url_for(&request.endpoint)?;
        let headers = self.headers_for(&request, request_id)?;

        let builder = self
            .inner
            .http
            .request(request.method, url)
            .headers(headers);
        let builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => {
                builder.body(serde_json::to_vec(&value).map_err(ApiError::Encode)?)
            }
            RequestBody::Form(pairs) => builder.body(
                url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(pairs)
                    .finish(),
            ),
        };

        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "request failed");
            ApiError::Transport(e)
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            warn!(error = %e, %status, "failed to read response body");
            ApiError::Transport(e)
        })?;

        if !status.is_success() {
            let err = ApiError::from_response(status, &bytes);
            warn!(status = status.as_u16(), error = %err, "API returned an error");
            return Err(err);
        }

        debug!(status = status.as_u16(), bytes = bytes.len(), "request succeeded");
        decode_body(&bytes)
    }

    fn url_for(&self, endpoint: &str) -> Result<Url, ApiError> {
        if !endpoint.starts_with('/') {
            return Err(ApiError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: "must start with '/'".to_string(),
            });
        }
        Url::parse(&format!("{}{endpoint}", self.inner.base_url)).map_err(|e| {
            ApiError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            }
        })
    }

    /// Defaults, then caller overrides, then the bearer token.
    fn headers_for(&self, request: &ApiRequest, request_id: Uuid) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        match request.body {
            RequestBody::Empty => {}
            RequestBody::Json(_) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
            RequestBody::Form(_) => {
                headers.insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static("application/x-www-form-urlencoded"),
                );
            }
        }
        headers.insert(
            HeaderName::from_static(REQUEST_ID_HEADER),
            HeaderValue::from_str(&request_id.to_string())
                .map_err(|e| ApiError::InvalidHeader(e.to_string()))?,
        );

        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::InvalidHeader(format!("{name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ApiError::InvalidHeader(format!("{name}: {e}")))?;
            headers.insert(name, value);
        }

        match self.inner.tokens.get() {
            Some(token) => {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                    .map_err(|_| ApiError::InvalidHeader("authorization token".to_string()))?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            None => {
                headers.remove(AUTHORIZATION);
            }
        }

        Ok(headers)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("tokens", &self.inner.tokens)
            .finish_non_exhaustive()
    }
}

/// Decode a success body; an empty body reads as `null`.
fn decode_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    let bytes = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"null".as_slice()
    } else {
        bytes
    };
    serde_json::from_slice(bytes).map_err(ApiError::Decode)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::MemoryStore;

    fn client(base: &str) -> ApiClient {
        ApiClient::with_base_url(Url::parse(base).unwrap(), Arc::new(MemoryStore::new())).unwrap()
    }

    #[test]
    fn test_url_keeps_base_path() {
        let api = client("https://api.example.com/v1/");
        assert_eq!(
            api.url_for("/auth/profile").unwrap().as_str(),
            "https://api.example.com/v1/auth/profile"
        );
    }

    #[test]
    fn test_url_requires_leading_slash() {
        let api = client("http://localhost:8000");
        assert!(matches!(
            api.url_for("auth/profile"),
            Err(ApiError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn test_headers_without_token() {
        let api = client("http://localhost:8000");
        let request = ApiRequest::get("/watches/1").header("Authorization", "Bearer forged");
        let headers = api.headers_for(&request, Uuid::new_v4()).unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
        assert!(headers.get(CONTENT_TYPE).is_none());
        assert!(headers.get(REQUEST_ID_HEADER).is_some());
    }

    #[test]
    fn test_headers_with_token_and_override() {
        let api = client("http://localhost:8000");
        api.set_token(SecretString::from("T")).unwrap();

        let request = ApiRequest::post("/x")
            .json(&serde_json::json!({"a": 1}))
            .unwrap()
            .header("Content-Type", "text/plain");
        let headers = api.headers_for(&request, Uuid::new_v4()).unwrap();

        assert_eq!(headers[AUTHORIZATION], "Bearer T");
        assert!(headers[AUTHORIZATION].is_sensitive());
        assert_eq!(headers[CONTENT_TYPE], "text/plain");

        api.clear_token();
        let headers = api.headers_for(&request, Uuid::new_v4()).unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_form_body_content_type() {
        let api = client("http://localhost:8000");
        let request = ApiRequest::post("/auth/login").form([("username", "a@b.com")]);
        let headers = api.headers_for(&request, Uuid::new_v4()).unwrap();
        assert_eq!(headers[CONTENT_TYPE], "application/x-www-form-urlencoded");
    }

    #[test]
    fn test_empty_body_decodes_as_null() {
        decode_body::<()>(b"").unwrap();
        assert_eq!(decode_body::<Option<u32>>(b"  ").unwrap(), None);
        assert_eq!(decode_body::<u32>(b"7").unwrap(), 7);
        assert!(matches!(decode_body::<u32>(b"{"), Err(ApiError::Decode(_))));
    }

    #[test]
    fn test_debug_hides_token() {
        let api = client("http://localhost:8000");
        api.set_token(SecretString::from("hidden-token")).unwrap();
        assert!(!format!("{api:?}").contains("hidden-token"));
    }
}
