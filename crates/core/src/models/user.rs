//! Accounts, credentials and balances.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::types::timestamp;
use crate::{Email, UserId, UserRole};

/// The signed-in account as returned by `GET /auth/profile`.
///
/// Replaced wholesale on every session refresh; never patched locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub email: Email,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub stellar_public_key: Option<String>,
    #[serde(default)]
    pub balance_brl: Decimal,
    #[serde(default)]
    pub balance_xlm: Decimal,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
}

const fn active_by_default() -> bool {
    true
}

impl User {
    /// Whether the account can reach the admin dashboard.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Email/password pair for `POST /auth/login`.
///
/// Sent form-encoded as `username`/`password`, so it is not `Serialize`.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    pub email: Email,
    pub password: SecretString,
}

impl LoginCredentials {
    #[must_use]
    pub const fn new(email: Email, password: SecretString) -> Self {
        Self { email, password }
    }
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub full_name: String,
    pub email: Email,
    #[serde(serialize_with = "super::expose_secret")]
    pub password: SecretString,
    pub role: UserRole,
}

impl NewUser {
    /// The credentials the account can log in with once created.
    #[must_use]
    pub fn credentials(&self) -> LoginCredentials {
        LoginCredentials::new(self.email.clone(), self.password.clone())
    }
}

/// Token pair returned by `POST /auth/login`.
///
/// `access_token` is optional so a malformed success body can be reported as
/// a failed login rather than a decode error.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Wallet balances from `GET /auth/balance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    #[serde(default)]
    pub balance_brl: Decimal,
    #[serde(default)]
    pub balance_xlm: Decimal,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_user_from_minimal_profile() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": 3,
            "full_name": "Ana Lima",
            "email": "ana@luxtime.com.br",
            "role": "store",
            "created_at": "2025-02-10T09:15:00.000123"
        }))
        .unwrap();

        assert_eq!(user.id, UserId::new(3));
        assert_eq!(user.role, UserRole::Store);
        assert_eq!(user.balance_brl, Decimal::ZERO);
        assert!(user.is_active);
        assert!(user.created_at.is_some());
        assert!(!user.is_admin());
    }

    #[test]
    fn test_user_accepts_float_balances() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": 1,
            "full_name": "A",
            "email": "a@b.com",
            "role": "admin",
            "balance_brl": 1500.5,
            "balance_xlm": 12
        }))
        .unwrap();

        assert_eq!(user.balance_brl, Decimal::new(15005, 1));
        assert_eq!(user.balance_xlm, Decimal::new(12, 0));
    }

    #[test]
    fn test_new_user_serializes_password() {
        let new_user = NewUser {
            full_name: "Ana".to_string(),
            email: Email::parse("ana@b.com").unwrap(),
            password: SecretString::from("hunter22"),
            role: UserRole::User,
        };

        let json = serde_json::to_value(&new_user).unwrap();
        assert_eq!(json["password"], "hunter22");
        assert_eq!(json["role"], "user");

        let creds = new_user.credentials();
        assert_eq!(creds.email.as_str(), "ana@b.com");
        assert_eq!(creds.password.expose_secret(), "hunter22");
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = LoginCredentials::new(
            Email::parse("a@b.com").unwrap(),
            SecretString::from("x-very-secret"),
        );
        assert!(!format!("{creds:?}").contains("x-very-secret"));
    }
}
