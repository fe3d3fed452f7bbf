//! LuxTime Client - API access and client-side state.
//!
//! This crate is everything a LuxTime front end needs below its UI:
//! - [`api`] - HTTP wrapper with bearer auth, error normalization and typed
//!   resource methods (auth, catalog, notifications, admin)
//! - [`session`] - Who is signed in, with stale-response protection
//! - [`favorites`] - Locally persisted favorite listings
//! - [`storage`] - Durable key-value store backing the token and favorites
//! - [`config`] - Environment-driven configuration
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use luxtime_client::{ApiClient, ClientConfig, FileStore, Session};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let storage = Arc::new(FileStore::open(&config.storage_path)?);
//! let api = ApiClient::new(&config, storage)?;
//!
//! let session = Session::new(api);
//! if let Some(user) = session.restore().await.user() {
//!     println!("signed in as {}", user.email);
//! }
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod favorites;
pub mod session;
pub mod storage;

pub use api::{ApiClient, ApiError, ApiRequest};
pub use config::{ClientConfig, ConfigError};
pub use favorites::Favorites;
pub use session::{Session, SessionError, SessionState};
pub use storage::{FileStore, KeyValueStore, MemoryStore, SharedStore, StorageError};
