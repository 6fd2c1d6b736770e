//! Integration tests for the authentication flow.

use axum::http::StatusCode;
use chrono::Duration;
use futures::future::join_all;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new();
    app.create_test_user("alice@example.com", "password123", &["Technician"]);

    let body = app.login("alice@example.com", "password123").await;

    assert!(body["accessToken"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(body["refreshToken"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(body["accessTokenExpiry"].is_string());
    assert!(body["refreshTokenExpiry"].is_string());
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["roles"], json!(["Technician"]));
}

#[tokio::test]
async fn test_login_failures_share_one_response() {
    let app = TestApp::new();
    app.create_test_user("bob@example.com", "password123", &[]);

    let wrong_password = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "bob@example.com", "password": "wrongpassword" })),
            None,
        )
        .await;
    let unknown_user = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "nobody@example.com", "password": "password123" })),
            None,
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_user.body);
    assert_eq!(wrong_password.str("error"), "auth.invalid_credentials");
}

#[tokio::test]
async fn test_login_validates_body() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "not-an-email", "password": "password123" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.str("error"), "validation_error");

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "a@example.com", "password": "123" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request("POST", "/api/auth/login", Some(json!({ "email": 5 })), None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_rotation_over_http() {
    let app = TestApp::new();
    app.create_test_user("alice@example.com", "password123", &[]);
    let login = app.login("alice@example.com", "password123").await;
    let rt1 = login["refreshToken"].as_str().unwrap().to_string();

    let second = app
        .request("POST", "/api/auth/refresh", Some(json!({ "refreshToken": rt1 })), None)
        .await;
    assert_eq!(second.status, StatusCode::OK);
    let rt2 = second.str("refreshToken").to_string();
    assert_ne!(rt1, rt2);
    assert!(second.body.get("email").is_none());

    let replay = app
        .request("POST", "/api/auth/refresh", Some(json!({ "refreshToken": rt1 })), None)
        .await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);
    assert_eq!(replay.str("error"), "auth.invalid_refresh_token");

    let third = app
        .request("POST", "/api/auth/refresh", Some(json!({ "refreshToken": rt2 })), None)
        .await;
    assert_eq!(third.status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_with_empty_token_is_bad_request() {
    let app = TestApp::new();
    let response = app
        .request("POST", "/api/auth/refresh", Some(json!({ "refreshToken": "" })), None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_after_user_deactivated() {
    let app = TestApp::new();
    let user_id = app.create_test_user("carol@example.com", "password123", &[]);
    let login = app.login("carol@example.com", "password123").await;

    app.users.deactivate(user_id);

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refreshToken": login["refreshToken"] })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.str("error"), "auth.user_not_found");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_refresh_over_http_has_one_winner() {
    let app = TestApp::new();
    app.create_test_user("dave@example.com", "password123", &[]);
    let login = app.login("dave@example.com", "password123").await;
    let token = login["refreshToken"].clone();

    let responses = join_all((0..8).map(|_| {
        app.request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refreshToken": token })),
            None,
        )
    }))
    .await;

    let ok = responses.iter().filter(|r| r.status == StatusCode::OK).count();
    let rejected = responses
        .iter()
        .filter(|r| r.status == StatusCode::UNAUTHORIZED)
        .count();
    assert_eq!(ok, 1);
    assert_eq!(rejected, 7);
    assert_eq!(app.store.len().await, 2);
}

#[tokio::test]
async fn test_me_authenticated() {
    let app = TestApp::new();
    let user_id = app.create_test_user("erin@example.com", "password123", &["Admin", "Technician"]);
    let login = app.login("erin@example.com", "password123").await;
    let token = login["accessToken"].as_str().unwrap();

    let response = app.request("GET", "/api/auth/me", None, Some(token)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.str("id"), user_id.to_string());
    assert_eq!(response.str("email"), "erin@example.com");
    assert_eq!(response.body["roles"], json!(["Admin", "Technician"]));
    assert_eq!(response.body["expiresAt"], login["accessTokenExpiry"]);
}

#[tokio::test]
async fn test_me_rejects_missing_garbage_and_expired_tokens() {
    let app = TestApp::new();
    app.create_test_user("frank@example.com", "password123", &[]);
    let login = app.login("frank@example.com", "password123").await;
    let token = login["accessToken"].as_str().unwrap();

    let missing = app.request("GET", "/api/auth/me", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.str("error"), "auth.invalid_token");

    let garbage = app.request("GET", "/api/auth/me", None, Some("abc.def.ghi")).await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);

    app.clock.advance(Duration::hours(6));
    let expired = app.request("GET", "/api/auth/me", None, Some(token)).await;
    assert_eq!(expired.status, StatusCode::UNAUTHORIZED);
    assert_eq!(expired.str("error"), "auth.invalid_token");
}

#[tokio::test]
async fn test_sessions_and_logout() {
    let app = TestApp::new();
    app.create_test_user("gina@example.com", "password123", &[]);
    app.login("gina@example.com", "password123").await;
    let login = app.login("gina@example.com", "password123").await;
    let token = login["accessToken"].as_str().unwrap();

    let sessions = app.request("GET", "/api/auth/sessions", None, Some(token)).await;
    assert_eq!(sessions.status, StatusCode::OK);
    let list = sessions.body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert!(list.iter().all(|s| s.get("token").is_none()));
    assert!(list.iter().all(|s| s["id"].is_string() && s["expiresAt"].is_string()));

    let logout = app.request("POST", "/api/auth/logout", None, Some(token)).await;
    assert_eq!(logout.status, StatusCode::OK);
    assert_eq!(logout.body["revoked"], 2);

    let again = app.request("POST", "/api/auth/logout", None, Some(token)).await;
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

    let sessions = app.request("GET", "/api/auth/sessions", None, Some(token)).await;
    assert_eq!(sessions.body, json!([]));
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.str("status"), "ok");
    assert!(response.body.get("database").is_none());
}

#[tokio::test]
async fn test_change_password_revokes_sessions() {
    let app = TestApp::new();
    app.create_test_user("hana@example.com", "password123", &[]);
    let login = app.login("hana@example.com", "password123").await;
    let token = login["accessToken"].as_str().unwrap();

    let weak = app
        .request(
            "PUT",
            "/api/auth/password",
            Some(json!({ "currentPassword": "password123", "newPassword": "password" })),
            Some(token),
        )
        .await;
    assert_eq!(weak.status, StatusCode::BAD_REQUEST);
    assert_eq!(weak.str("error"), "auth.weak_password");

    let wrong_current = app
        .request(
            "PUT",
            "/api/auth/password",
            Some(json!({ "currentPassword": "guess", "newPassword": "Looking-Glass7" })),
            Some(token),
        )
        .await;
    assert_eq!(wrong_current.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_current.str("error"), "auth.invalid_credentials");

    let changed = app
        .request(
            "PUT",
            "/api/auth/password",
            Some(json!({ "currentPassword": "password123", "newPassword": "Looking-Glass7" })),
            Some(token),
        )
        .await;
    assert_eq!(changed.status, StatusCode::OK);
    assert_eq!(changed.body["revoked"], 1);

    let refresh = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refreshToken": login["refreshToken"] })),
            None,
        )
        .await;
    assert_eq!(refresh.status, StatusCode::UNAUTHORIZED);

    app.login("hana@example.com", "Looking-Glass7").await;
}

#[tokio::test]
async fn test_change_password_requires_access_token() {
    let app = TestApp::new();
    let response = app
        .request(
            "PUT",
            "/api/auth/password",
            Some(json!({ "currentPassword": "a", "newPassword": "Looking-Glass7" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
