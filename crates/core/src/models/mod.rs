//! Records exchanged with the LuxTime API.
//!
//! Response types are lenient: optional fields default instead of failing,
//! because the server's schemas grew fields over time and older rows lack
//! them. Request types serialize exactly the fields the server reads.

pub mod admin;
pub mod notification;
pub mod user;
pub mod watch;

pub use admin::*;
pub use notification::*;
pub use user::*;
pub use watch::*;

use secrecy::{ExposeSecret, SecretString};
use serde::Serializer;

/// Serialize a secret as its plain value. Only for request bodies.
pub(crate) fn expose_secret<S: Serializer>(
    secret: &SecretString,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Serialize an optional secret as its plain value or `null`.
#[allow(clippy::ref_option)] // serde's serialize_with signature
pub(crate) fn expose_optional_secret<S: Serializer>(
    secret: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(secret) => serializer.serialize_str(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}
