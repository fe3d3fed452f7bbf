//! LuxTime Core - Shared types library.
//!
//! This crate provides the domain types exchanged with the LuxTime marketplace
//! API and shared by the client components:
//! - `client` - HTTP wrapper, session and favorites providers
//! - `cli` - Command-line front end over the client
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage.
//! The API server is the source of truth; these types mirror its JSON shapes
//! and perform no business validation beyond what parsing requires.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, email addresses, role and status enums, timestamps
//! - [`models`] - Records sent to and received from the API

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;

pub use models::*;
pub use types::*;
