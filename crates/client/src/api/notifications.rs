//! Notification inbox endpoints.

use luxtime_core::{Notification, NotificationId};
use serde::de::IgnoredAny;
use tracing::instrument;

use super::{ApiClient, ApiError, ApiRequest};

impl ApiClient {
    /// Notifications for the current account (`GET /notifications`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or server failures.
    #[instrument(skip(self))]
    pub async fn notifications(&self) -> Result<Vec<Notification>, ApiError> {
        self.get("/notifications").await
    }

    /// Mark one notification read (`POST /notifications/{id}/read`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` (404) if the notification does not belong
    /// to the current account.
    #[instrument(skip(self))]
    pub async fn mark_notification_read(&self, id: NotificationId) -> Result<(), ApiError> {
        self.send::<IgnoredAny>(ApiRequest::post(format!("/notifications/{id}/read")))
            .await
            .map(drop)
    }

    /// Mark every notification read (`POST /notifications/mark-all-read`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or server failures.
    #[instrument(skip(self))]
    pub async fn mark_all_notifications_read(&self) -> Result<(), ApiError> {
        self.send::<IgnoredAny>(ApiRequest::post("/notifications/mark-all-read"))
            .await
            .map(drop)
    }

    /// Delete a notification (`DELETE /notifications/{id}`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or server failures.
    #[instrument(skip(self))]
    pub async fn delete_notification(&self, id: NotificationId) -> Result<(), ApiError> {
        self.send::<IgnoredAny>(ApiRequest::delete(format!("/notifications/{id}")))
            .await
            .map(drop)
    }
}
