//! Integration tests for administrative token revocation.

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::helpers::{ADMIN_API_KEY, TestApp};

fn revoke_path(user_id: Uuid) -> String {
    format!("/api/admin/users/{user_id}/revoke-tokens")
}

#[tokio::test]
async fn test_revoke_tokens_with_api_key() {
    let app = TestApp::new();
    let user_id = app.create_test_user("henry@example.com", "password123", &[]);
    let login = app.login("henry@example.com", "password123").await;
    app.login("henry@example.com", "password123").await;

    let header = app.auth.api_key_header.clone();
    let response = app
        .request_with_headers(
            "POST",
            &revoke_path(user_id),
            Some(json!({ "reason": "Compromised device" })),
            &[(header.as_str(), ADMIN_API_KEY)],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["revoked"], 2);

    let again = app
        .request_with_headers(
            "POST",
            &revoke_path(user_id),
            Some(json!({ "reason": "Compromised device" })),
            &[(header.as_str(), ADMIN_API_KEY)],
        )
        .await;
    assert_eq!(again.body["revoked"], 0);

    let refresh = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refreshToken": login["refreshToken"] })),
            None,
        )
        .await;
    assert_eq!(refresh.status, StatusCode::UNAUTHORIZED);

    let records = app.store_records(user_id).await;
    assert!(records
        .iter()
        .all(|r| r.reason_revoked.as_deref() == Some("Compromised device")));
}

#[tokio::test]
async fn test_revoke_tokens_requires_valid_api_key() {
    let app = TestApp::new();
    let user_id = app.create_test_user("iris@example.com", "password123", &[]);
    app.login("iris@example.com", "password123").await;
    let header = app.auth.api_key_header.clone();

    let missing = app
        .request("POST", &revoke_path(user_id), Some(json!({ "reason": "x" })), None)
        .await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.str("error"), "auth.invalid_api_key");

    let wrong = app
        .request_with_headers(
            "POST",
            &revoke_path(user_id),
            Some(json!({ "reason": "x" })),
            &[(header.as_str(), "not-a-key")],
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    assert_eq!(app.store_records(user_id).await.len(), 1);
    assert!(app.store_records(user_id).await[0].revoked_at.is_none());
}

#[tokio::test]
async fn test_revoke_tokens_validates_reason() {
    let app = TestApp::new();
    let header = app.auth.api_key_header.clone();

    let response = app
        .request_with_headers(
            "POST",
            &revoke_path(Uuid::new_v4()),
            Some(json!({ "reason": "" })),
            &[(header.as_str(), ADMIN_API_KEY)],
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
