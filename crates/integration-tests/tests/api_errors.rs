//! Error normalization over real HTTP responses.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::http::StatusCode;
use luxtime_client::api::GENERIC_ERROR;
use luxtime_client::{ApiClient, ApiError, ApiRequest, MemoryStore};
use luxtime_core::WatchId;
use luxtime_integration_tests::{MockApi, closed_port_url};
use secrecy::SecretString;
use serde_json::Value;

async fn fixture(mock: &MockApi, kind: &str) -> ApiError {
    mock.client(Arc::new(MemoryStore::new()))
        .get::<Value>(&format!("/errors/{kind}"))
        .await
        .unwrap_err()
}

#[tokio::test]
async fn test_string_detail_is_the_message() {
    let mock = MockApi::start().await;
    let err = fixture(&mock, "string").await;

    assert_eq!(err.to_string(), "Watch not available");
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    assert!(err.is_rejection());
}

#[tokio::test]
async fn test_validation_list_uses_first_entry() {
    let mock = MockApi::start().await;

    assert_eq!(
        fixture(&mock, "list").await.message(),
        "ensure this value is greater than 0"
    );
    assert_eq!(
        fixture(&mock, "list-message").await.message(),
        "year is out of range"
    );
    assert_eq!(fixture(&mock, "list-empty").await.message(), "Validation error");
}

#[tokio::test]
async fn test_object_detail_and_top_level_message() {
    let mock = MockApi::start().await;

    let err = fixture(&mock, "object").await;
    assert_eq!(err.message(), "Store not approved");
    assert_eq!(err.status(), Some(StatusCode::CONFLICT));

    let err = fixture(&mock, "message").await;
    assert_eq!(err.message(), "Internal failure");
    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
}

#[tokio::test]
async fn test_unreadable_error_bodies_are_generic() {
    let mock = MockApi::start().await;

    let err = fixture(&mock, "html").await;
    assert_eq!(err.message(), GENERIC_ERROR);
    assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));

    let err = fixture(&mock, "empty").await;
    assert_eq!(err.message(), GENERIC_ERROR);
    assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
}

#[tokio::test]
async fn test_not_found_watch() {
    let mock = MockApi::start().await;
    let api = mock.client(Arc::new(MemoryStore::new()));

    let err = api.watch(WatchId::new(999)).await.unwrap_err();

    assert_eq!(err.to_string(), "Watch not found");
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn test_empty_success_body_is_null() {
    let mock = MockApi::start().await;
    let api = mock.client(Arc::new(MemoryStore::new()));

    let value: Value = api.get("/errors/ok-empty").await.unwrap();
    assert_eq!(value, Value::Null);

    let unit: Option<Value> = api.get("/errors/ok-empty").await.unwrap();
    assert_eq!(unit, None);
}

#[tokio::test]
async fn test_garbage_success_body_is_decode_error() {
    let mock = MockApi::start().await;
    let api = mock.client(Arc::new(MemoryStore::new()));

    let err = api.get::<Value>("/errors/ok-garbage").await.unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)));
    assert!(!err.is_rejection());
}

#[tokio::test]
async fn test_unreachable_server_is_connection_error() {
    let api = ApiClient::with_base_url(closed_port_url().await, Arc::new(MemoryStore::new()))
        .unwrap();

    let err = api.get::<Value>("/watches/marketplace").await.unwrap_err();

    assert!(matches!(err, ApiError::Transport(_)));
    assert!(err.to_string().starts_with("Connection error"));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_endpoint_without_leading_slash_is_refused() {
    let mock = MockApi::start().await;
    let api = mock.client(Arc::new(MemoryStore::new()));

    let err = api.get::<Value>("watches/marketplace").await.unwrap_err();

    assert!(matches!(err, ApiError::InvalidEndpoint { .. }));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_each_request_gets_its_own_id() {
    let mock = MockApi::start().await;
    let api = mock.client(Arc::new(MemoryStore::new()));

    api.get::<Value>("/watches/marketplace").await.unwrap();
    api.get::<Value>("/watches/marketplace").await.unwrap();

    let ids: Vec<String> = mock
        .requests()
        .into_iter()
        .map(|r| r.request_id.unwrap())
        .collect();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
}

#[tokio::test]
async fn test_caller_headers_cannot_replace_bearer_token() {
    let mock = MockApi::start().await;
    mock.add_user("Ana Lima", "ana@luxtime.com.br", "hunter22", "user");
    let token = mock.token_for("ana@luxtime.com.br");
    let api = mock.client(Arc::new(MemoryStore::new()));
    api.set_token(SecretString::from(token.clone())).unwrap();

    let request = ApiRequest::get("/auth/balance")
        .header("Authorization", "Bearer forged")
        .header("x-request-id", "fixed-id");
    let _: Value = api.send(request).await.unwrap();

    let seen = mock.requests_to("/auth/balance");
    assert_eq!(
        seen[0].authorization.as_deref(),
        Some(format!("Bearer {token}").as_str())
    );
    assert_eq!(seen[0].request_id.as_deref(), Some("fixed-id"));
}
