//! Admin dashboard views.
//!
//! These mirror what the admin pages render. The API joins extra columns
//! (owner names, counters) that the plain records do not carry, so most of
//! them default when absent.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::timestamp;
use crate::{
    CertificationLevel, EvaluationId, EvaluationPriority, EvaluationStatus, EvaluatorId, StoreId,
    StoreStatus, User, UserId, WatchId,
};

/// A user row on `/admin/users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    #[serde(flatten)]
    pub user: User,
    #[serde(default, with = "timestamp::option")]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_purchases: Option<u32>,
    #[serde(default)]
    pub total_sales: Option<u32>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// A store row on `/admin/stores`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminStore {
    pub id: StoreId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner_id: Option<UserId>,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub status: StoreStatus,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_watches: u32,
    #[serde(default)]
    pub total_sales: u32,
    #[serde(default)]
    pub average_rating: Decimal,
    #[serde(default, with = "timestamp::option")]
    pub last_activity: Option<DateTime<Utc>>,
}

/// An authenticity evaluation on `/admin/evaluations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: EvaluationId,
    pub watch_id: WatchId,
    #[serde(default)]
    pub watch_brand: Option<String>,
    #[serde(default)]
    pub watch_model: Option<String>,
    #[serde(default)]
    pub watch_reference: Option<String>,
    #[serde(default)]
    pub evaluator_id: Option<EvaluatorId>,
    #[serde(default)]
    pub evaluator_name: Option<String>,
    #[serde(default)]
    pub store_id: Option<StoreId>,
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub status: EvaluationStatus,
    #[serde(default)]
    pub priority: EvaluationPriority,
    #[serde(default)]
    pub estimated_value: Option<Decimal>,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
}

/// An evaluator on `/admin/evaluators`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluator {
    pub id: EvaluatorId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub years_experience: u32,
    #[serde(default)]
    pub certification_level: CertificationLevel,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_evaluations: u32,
    #[serde(default)]
    pub completed_evaluations: u32,
    #[serde(default)]
    pub pending_evaluations: u32,
}

/// Entry of `/admin/evaluators/available`, used by the assign dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorSummary {
    pub id: EvaluatorId,
    pub name: String,
}

/// Body of `POST /admin/evaluators`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewEvaluator {
    pub user_id: UserId,
    pub specialties: Vec<String>,
    pub years_experience: u32,
    pub certification_level: CertificationLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Counters on the admin home page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardStats {
    pub users: UserStats,
    pub watches: WatchStats,
    pub evaluations: EvaluationStats,
    pub financial: FinancialStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserStats {
    pub total: u64,
    pub active: u64,
    pub stores: u64,
    pub evaluators: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchStats {
    pub total: u64,
    pub approved: u64,
    pub pending: u64,
    pub rejected: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationStats {
    pub total: u64,
    pub pending: u64,
    pub completed: u64,
    pub approved: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialStats {
    pub total_transactions: u64,
    pub total_volume: Decimal,
    pub pending_payments: u64,
}

/// One line of the admin activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentActivity {
    pub id: String,
    /// Free-form category (`user_registration`, `watch_sale`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(default, with = "timestamp::option")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_user_flattens_profile() {
        let row: AdminUser = serde_json::from_value(serde_json::json!({
            "id": 4,
            "full_name": "Bruno",
            "email": "bruno@b.com",
            "role": "evaluator",
            "is_active": false,
            "total_purchases": 2
        }))
        .unwrap();

        assert_eq!(row.user.id, UserId::new(4));
        assert!(!row.user.is_active);
        assert_eq!(row.total_purchases, Some(2));
    }

    #[test]
    fn test_dashboard_stats_tolerates_missing_sections() {
        let stats: DashboardStats = serde_json::from_value(serde_json::json!({
            "users": { "total": 10, "active": 8 }
        }))
        .unwrap();

        assert_eq!(stats.users.total, 10);
        assert_eq!(stats.users.stores, 0);
        assert_eq!(stats.financial.total_volume, Decimal::ZERO);
    }
}
