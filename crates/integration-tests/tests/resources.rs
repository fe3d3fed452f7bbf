//! Catalog, notification and admin endpoints against the mock API.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::http::StatusCode;
use luxtime_client::{ApiClient, MemoryStore};
use luxtime_core::{
    CertificationLevel, EvaluationId, EvaluationStatus, EvaluatorId, NewEvaluator, NewWatch,
    NotificationId, NotificationKind, PaymentMethod, PurchaseRequest, PurchaseStatus, StoreId,
    StoreStatus, UserId, WatchCondition, WatchFilter, WatchId, unread_count,
};
use luxtime_integration_tests::MockApi;
use rust_decimal::Decimal;
use secrecy::SecretString;

/// A client signed in as a fresh account with `role`.
fn signed_in(mock: &MockApi, role: &str) -> ApiClient {
    let email = format!("{role}@luxtime.com.br");
    mock.add_user("Test Account", &email, "hunter22", role);
    let api = mock.client(Arc::new(MemoryStore::new()));
    api.set_token(SecretString::from(mock.token_for(&email)))
        .unwrap();
    api
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_marketplace_query_uses_api_names() {
    let mock = MockApi::start().await;
    let api = mock.client(Arc::new(MemoryStore::new()));

    let filter = WatchFilter {
        brand: Some("Patek Philippe".to_string()),
        condition: Some(WatchCondition::Novo),
        price_min: Some(Decimal::new(100, 0)),
        price_max: Some(Decimal::new(200, 0)),
        ..WatchFilter::default()
    };
    api.watches(&filter).await.unwrap();

    let seen = mock.requests_to("/watches/marketplace");
    assert_eq!(
        seen[0].query.as_deref(),
        Some("brand=Patek+Philippe&condition=novo&min_price=100&max_price=200")
    );
}

#[tokio::test]
async fn test_empty_filter_sends_no_query() {
    let mock = MockApi::start().await;
    let api = mock.client(Arc::new(MemoryStore::new()));

    let watches = api.watches(&WatchFilter::default()).await.unwrap();

    assert_eq!(watches.len(), 2);
    assert!(watches.iter().all(|w| !w.is_sold));
    assert_eq!(mock.requests_to("/watches/marketplace")[0].query, None);
}

#[tokio::test]
async fn test_legacy_price_field_is_read() {
    let mock = MockApi::start().await;
    let api = mock.client(Arc::new(MemoryStore::new()));

    let omega = api.watch(WatchId::new(2)).await.unwrap();

    assert_eq!(omega.brand, "Omega");
    assert_eq!(omega.price, Some(Decimal::new(42_000, 0)));
    assert_eq!(omega.condition, Some(WatchCondition::Usado));
}

#[tokio::test]
async fn test_store_lists_a_watch() {
    let mock = MockApi::start().await;
    let api = signed_in(&mock, "store");

    let new_watch = NewWatch {
        brand: "Cartier".to_string(),
        model: "Santos".to_string(),
        reference: "WSSA0018".to_string(),
        serial_number: "SN-0001".to_string(),
        year: Some(2021),
        condition: WatchCondition::Seminovo,
        price: Decimal::new(3_550_000, 2),
        description: None,
        images: Vec::new(),
    };
    let created = api.create_watch(&new_watch).await.unwrap();

    assert_eq!(created.id, WatchId::new(4));
    assert_eq!(created.brand, "Cartier");
    assert_eq!(created.price, Some(Decimal::new(35_500, 0)));

    let sent = mock.bodies("/watches");
    assert_eq!(sent[0]["condition"], "seminovo");
    assert_eq!(sent[0]["price"], 35_500.0);
    assert!(sent[0].get("description").is_none());
}

#[tokio::test]
async fn test_buyer_cannot_list_a_watch() {
    let mock = MockApi::start().await;
    let api = signed_in(&mock, "user");

    let new_watch = NewWatch {
        brand: "Tudor".to_string(),
        model: "Black Bay".to_string(),
        reference: "79230N".to_string(),
        serial_number: "SN-0002".to_string(),
        year: None,
        condition: WatchCondition::Usado,
        price: Decimal::new(18_000, 0),
        description: None,
        images: Vec::new(),
    };
    let err = api.create_watch(&new_watch).await.unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    assert_eq!(err.message(), "Only stores can list watches");
}

#[tokio::test]
async fn test_purchase_then_sold_out() {
    let mock = MockApi::start().await;
    let api = signed_in(&mock, "user");

    let purchase = api
        .purchase_watch(WatchId::new(1), &PurchaseRequest::pix())
        .await
        .unwrap();

    assert_eq!(purchase.watch_id, WatchId::new(1));
    assert_eq!(purchase.amount, Decimal::new(89_900, 0));
    assert_eq!(purchase.status, PurchaseStatus::Completed);
    assert_eq!(purchase.payment_method, Some(PaymentMethod::Brl));
    assert_eq!(mock.bodies("/watches/1/purchase")[0]["payment_method"], "pix");

    let err = api
        .purchase_watch(WatchId::new(1), &PurchaseRequest::pix())
        .await
        .unwrap_err();
    assert_eq!(err.message(), "Watch already sold");
}

#[tokio::test]
async fn test_server_favorite_toggle() {
    let mock = MockApi::start().await;
    let api = signed_in(&mock, "user");

    assert!(api.toggle_favorite(WatchId::new(2)).await.unwrap().is_favorite);
    let favorites = api.favorites().await.unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].id, WatchId::new(2));

    assert!(!api.toggle_favorite(WatchId::new(2)).await.unwrap().is_favorite);
    assert!(mock.server_favorites().is_empty());
}

#[tokio::test]
async fn test_balance_requires_token() {
    let mock = MockApi::start().await;

    let anonymous = mock.client(Arc::new(MemoryStore::new()));
    let err = anonymous.balance().await.unwrap_err();
    assert_eq!(err.message(), "Could not validate credentials");

    let api = signed_in(&mock, "user");
    let balance = api.balance().await.unwrap();
    assert_eq!(balance.balance_brl, Decimal::new(15_005, 1));
    assert_eq!(balance.balance_xlm, Decimal::new(1_225, 2));
}

// =============================================================================
// Notifications
// =============================================================================

#[tokio::test]
async fn test_notification_inbox() {
    let mock = MockApi::start().await;
    let api = signed_in(&mock, "user");

    let inbox = api.notifications().await.unwrap();
    assert_eq!(inbox.len(), 3);
    assert_eq!(unread_count(&inbox), 2);
    assert_eq!(inbox[0].kind, NotificationKind::Success);
    assert_eq!(inbox[2].kind, NotificationKind::Other);

    api.mark_notification_read(NotificationId::new(1))
        .await
        .unwrap();
    assert_eq!(mock.notification_read(1), Some(true));

    api.mark_all_notifications_read().await.unwrap();
    assert_eq!(mock.notification_read(3), Some(true));
    assert_eq!(unread_count(&api.notifications().await.unwrap()), 0);
}

#[tokio::test]
async fn test_delete_notification_with_empty_response() {
    let mock = MockApi::start().await;
    let api = signed_in(&mock, "user");

    api.delete_notification(NotificationId::new(2)).await.unwrap();

    assert_eq!(mock.notification_read(2), None);
    let seen = mock.requests_to("/notifications/2");
    assert_eq!(seen[0].method, "DELETE");
}

#[tokio::test]
async fn test_mark_missing_notification() {
    let mock = MockApi::start().await;
    let api = signed_in(&mock, "user");

    let err = api
        .mark_notification_read(NotificationId::new(42))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(err.message(), "Notification not found");
}

// =============================================================================
// Admin
// =============================================================================

#[tokio::test]
async fn test_admin_endpoints_reject_non_admins() {
    let mock = MockApi::start().await;
    let api = signed_in(&mock, "store");

    let err = api.admin_users().await.unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    assert_eq!(err.message(), "Not enough permissions");
}

#[tokio::test]
async fn test_admin_listings() {
    let mock = MockApi::start().await;
    let api = signed_in(&mock, "admin");

    let users = api.admin_users().await.unwrap();
    assert_eq!(users.len(), 1);
    assert!(users[0].user.is_admin());
    assert_eq!(users[0].total_purchases, Some(2));

    let stores = api.admin_stores().await.unwrap();
    assert_eq!(stores[0].status, StoreStatus::Pending);
    assert_eq!(stores[0].average_rating, Decimal::new(48, 1));

    let evaluations = api.admin_evaluations().await.unwrap();
    assert_eq!(evaluations[0].status, EvaluationStatus::InProgress);

    let evaluators = api.admin_evaluators().await.unwrap();
    assert_eq!(evaluators[0].certification_level, CertificationLevel::Master);
    assert_eq!(evaluators[0].specialties, vec!["Rolex", "Omega"]);

    let available = api.available_evaluators().await.unwrap();
    assert_eq!(available[0].name, "Carlos Mendes");

    let stats = api.dashboard_stats().await.unwrap();
    assert_eq!(stats.users.total, 120);
    assert_eq!(stats.financial.total_volume, Decimal::new(19_800_005, 1));

    let activity = api.recent_activity().await.unwrap();
    assert_eq!(activity.len(), 2);
    assert_eq!(activity[0].kind, "user_registration");
    assert!(activity[1].timestamp.is_some());
}

#[tokio::test]
async fn test_admin_updates_send_expected_bodies() {
    let mock = MockApi::start().await;
    let api = signed_in(&mock, "admin");

    api.set_user_active(UserId::new(7), false).await.unwrap();
    api.set_store_status(StoreId::new(1), StoreStatus::Approved, None)
        .await
        .unwrap();
    api.set_store_status(
        StoreId::new(2),
        StoreStatus::Rejected,
        Some("Documentação incompleta"),
    )
    .await
    .unwrap();
    api.assign_evaluator(EvaluationId::new(8), EvaluatorId::new(2))
        .await
        .unwrap();
    api.set_evaluation_status(EvaluationId::new(8), EvaluationStatus::Approved)
        .await
        .unwrap();
    api.set_evaluator_active(EvaluatorId::new(2), true)
        .await
        .unwrap();

    assert_eq!(
        mock.bodies("/admin/users/7/status")[0],
        serde_json::json!({"is_active": false})
    );
    assert_eq!(
        mock.bodies("/admin/stores/1/status")[0],
        serde_json::json!({"status": "approved"})
    );
    assert_eq!(
        mock.bodies("/admin/stores/2/status")[0],
        serde_json::json!({"status": "rejected", "reason": "Documentação incompleta"})
    );
    assert_eq!(
        mock.bodies("/admin/evaluations/8/assign")[0],
        serde_json::json!({"evaluator_id": 2})
    );
    assert_eq!(
        mock.bodies("/admin/evaluations/8/status")[0],
        serde_json::json!({"status": "approved"})
    );
    assert_eq!(
        mock.bodies("/admin/evaluators/2/status")[0],
        serde_json::json!({"is_active": true})
    );
    assert!(
        mock.requests_to("/admin/users/7/status")[0]
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("application/json"))
    );
}

#[tokio::test]
async fn test_create_evaluator() {
    let mock = MockApi::start().await;
    let api = signed_in(&mock, "admin");

    let evaluator = api
        .create_evaluator(&NewEvaluator {
            user_id: UserId::new(5),
            specialties: vec!["Patek Philippe".to_string()],
            years_experience: 9,
            certification_level: CertificationLevel::Senior,
            notes: None,
        })
        .await
        .unwrap();

    assert_eq!(evaluator.id, EvaluatorId::new(9));
    assert_eq!(evaluator.years_experience, 9);
    assert_eq!(evaluator.certification_level, CertificationLevel::Senior);

    let sent = &mock.bodies("/admin/evaluators")[0];
    assert_eq!(sent["certification_level"], "senior");
    assert!(sent.get("notes").is_none());
}
