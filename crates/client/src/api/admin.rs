//! Admin dashboard endpoints. All require an admin token.

use luxtime_core::{
    AdminStore, AdminUser, DashboardStats, Evaluation, EvaluationId, EvaluationStatus, Evaluator,
    EvaluatorId, EvaluatorSummary, NewEvaluator, RecentActivity, StoreId, StoreStatus, UserId,
};
use serde::de::IgnoredAny;
use serde_json::json;
use tracing::instrument;

use super::{ApiClient, ApiError, ApiRequest};

impl ApiClient {
    async fn admin_update(&self, endpoint: String, body: serde_json::Value) -> Result<(), ApiError> {
        self.send::<IgnoredAny>(ApiRequest::put(endpoint).json(&body)?)
            .await
            .map(drop)
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// All accounts (`GET /admin/users`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` (403) for non-admin tokens.
    #[instrument(skip(self))]
    pub async fn admin_users(&self) -> Result<Vec<AdminUser>, ApiError> {
        self.get("/admin/users").await
    }

    /// Activate or suspend an account (`PUT /admin/users/{id}/status`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or server failures.
    #[instrument(skip(self))]
    pub async fn set_user_active(&self, id: UserId, active: bool) -> Result<(), ApiError> {
        self.admin_update(format!("/admin/users/{id}/status"), json!({ "is_active": active }))
            .await
    }

    // =========================================================================
    // Stores
    // =========================================================================

    /// All stores (`GET /admin/stores`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or server failures.
    #[instrument(skip(self))]
    pub async fn admin_stores(&self) -> Result<Vec<AdminStore>, ApiError> {
        self.get("/admin/stores").await
    }

    /// Approve or reject a store (`PUT /admin/stores/{id}/status`).
    ///
    /// `reason` is sent only when given, typically with a rejection.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or server failures.
    #[instrument(skip(self))]
    pub async fn set_store_status(
        &self,
        id: StoreId,
        status: StoreStatus,
        reason: Option<&str>,
    ) -> Result<(), ApiError> {
        let mut body = json!({ "status": status });
        if let (Some(reason), Some(fields)) = (reason, body.as_object_mut()) {
            fields.insert("reason".to_string(), json!(reason));
        }
        self.admin_update(format!("/admin/stores/{id}/status"), body)
            .await
    }

    // =========================================================================
    // Evaluations
    // =========================================================================

    /// The evaluation queue (`GET /admin/evaluations`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or server failures.
    #[instrument(skip(self))]
    pub async fn admin_evaluations(&self) -> Result<Vec<Evaluation>, ApiError> {
        self.get("/admin/evaluations").await
    }

    /// Hand an evaluation to an evaluator (`PUT /admin/evaluations/{id}/assign`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or server failures.
    #[instrument(skip(self))]
    pub async fn assign_evaluator(
        &self,
        evaluation: EvaluationId,
        evaluator: EvaluatorId,
    ) -> Result<(), ApiError> {
        self.admin_update(
            format!("/admin/evaluations/{evaluation}/assign"),
            json!({ "evaluator_id": evaluator }),
        )
        .await
    }

    /// Move an evaluation along its workflow (`PUT /admin/evaluations/{id}/status`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or server failures.
    #[instrument(skip(self))]
    pub async fn set_evaluation_status(
        &self,
        id: EvaluationId,
        status: EvaluationStatus,
    ) -> Result<(), ApiError> {
        self.admin_update(format!("/admin/evaluations/{id}/status"), json!({ "status": status }))
            .await
    }

    // =========================================================================
    // Evaluators
    // =========================================================================

    /// All evaluators (`GET /admin/evaluators`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or server failures.
    #[instrument(skip(self))]
    pub async fn admin_evaluators(&self) -> Result<Vec<Evaluator>, ApiError> {
        self.get("/admin/evaluators").await
    }

    /// Evaluators that can take new work (`GET /admin/evaluators/available`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or server failures.
    #[instrument(skip(self))]
    pub async fn available_evaluators(&self) -> Result<Vec<EvaluatorSummary>, ApiError> {
        self.get("/admin/evaluators/available").await
    }

    /// Promote an existing account to evaluator (`POST /admin/evaluators`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or server failures.
    #[instrument(skip(self, evaluator), fields(user_id = %evaluator.user_id))]
    pub async fn create_evaluator(&self, evaluator: &NewEvaluator) -> Result<Evaluator, ApiError> {
        self.send(ApiRequest::post("/admin/evaluators").json(evaluator)?)
            .await
    }

    /// Activate or deactivate an evaluator (`PUT /admin/evaluators/{id}/status`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or server failures.
    #[instrument(skip(self))]
    pub async fn set_evaluator_active(&self, id: EvaluatorId, active: bool) -> Result<(), ApiError> {
        self.admin_update(
            format!("/admin/evaluators/{id}/status"),
            json!({ "is_active": active }),
        )
        .await
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// Headline counters (`GET /admin/dashboard/stats`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or server failures.
    #[instrument(skip(self))]
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.get("/admin/dashboard/stats").await
    }

    /// Latest platform events (`GET /admin/dashboard/recent-activity`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or server failures.
    #[instrument(skip(self))]
    pub async fn recent_activity(&self) -> Result<Vec<RecentActivity>, ApiError> {
        self.get("/admin/dashboard/recent-activity").await
    }
}
