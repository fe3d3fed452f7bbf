//! Role and status enums exchanged with the API.
//!
//! All of these travel as lowercase strings. The ones a user can type on the
//! command line also implement `FromStr` with the same spelling.

use serde::{Deserialize, Serialize};

/// Implements `as_str`, `Display` and `FromStr` for a unit-only enum whose
/// wire spelling is listed next to each variant.
macro_rules! wire_names {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// The spelling used on the wire.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($name => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: stringify!($ty),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

/// A string did not name any variant of the target enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct UnknownVariant {
    /// Enum being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Account role. Decides which dashboard a user sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Marketplace operator.
    Admin,
    /// Credentialed watch dealer.
    Store,
    /// Authenticity evaluator.
    Evaluator,
    /// Regular buyer.
    #[default]
    User,
}

wire_names!(UserRole {
    Admin => "admin",
    Store => "store",
    Evaluator => "evaluator",
    User => "user",
});

/// Condition of a listed watch (Portuguese on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchCondition {
    /// Unworn.
    Novo,
    /// Lightly worn.
    Seminovo,
    /// Pre-owned.
    Usado,
}

wire_names!(WatchCondition {
    Novo => "novo",
    Seminovo => "seminovo",
    Usado => "usado",
});

/// How a purchase is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Brazilian real.
    Brl,
    /// Stellar lumens.
    Xlm,
    /// Other crypto asset through escrow.
    Crypto,
}

wire_names!(PaymentMethod {
    Brl => "brl",
    Xlm => "xlm",
    Crypto => "crypto",
});

/// Lifecycle of a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
}

/// Severity of a notification.
///
/// Kinds added server-side later deserialize as [`NotificationKind::Other`]
/// instead of failing the whole list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
    #[serde(other)]
    Other,
}

/// Review state of a store's credentialing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

wire_names!(StoreStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

/// Progress of an authenticity evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Approved,
    Rejected,
}

wire_names!(EvaluationStatus {
    Pending => "pending",
    InProgress => "in_progress",
    Completed => "completed",
    Approved => "approved",
    Rejected => "rejected",
});

/// Queue priority of an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationPriority {
    Low,
    #[default]
    Medium,
    High,
}

/// Seniority of an evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CertificationLevel {
    #[default]
    Junior,
    Senior,
    Master,
}

wire_names!(CertificationLevel {
    Junior => "junior",
    Senior => "senior",
    Master => "master",
});

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_spelling_matches_serde() {
        for role in [
            UserRole::Admin,
            UserRole::Store,
            UserRole::Evaluator,
            UserRole::User,
        ] {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
    }

    #[test]
    fn test_in_progress_is_snake_case() {
        let status: EvaluationStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(status, EvaluationStatus::InProgress);
        assert_eq!(status.to_string(), "in_progress");
    }

    #[test]
    fn test_unknown_notification_kind_is_other() {
        let kind: NotificationKind = serde_json::from_str("\"promotion\"").unwrap();
        assert_eq!(kind, NotificationKind::Other);
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        let err = "vintage".parse::<WatchCondition>().unwrap_err();
        assert_eq!(err.to_string(), "invalid WatchCondition: vintage");
    }
}
