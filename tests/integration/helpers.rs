//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Duration;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use ams_api::{Collaborators, build_app, build_state};
use ams_auth::testing::{
    ManualClock, MemoryApiKeys, MemoryUserDirectory, TEST_JWT_SECRET, account,
};
use ams_auth::{MemoryRefreshTokenStore, PasswordHasher, RefreshTokenStore};
use ams_core::config::{AuthConfig, ServerConfig};
use ams_core::traits::Clock;
use ams_entity::refresh_token::RefreshToken;

/// API key registered by every [`TestApp`].
pub const ADMIN_API_KEY: &str = "test-admin-key";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// User directory behind the router
    pub users: Arc<MemoryUserDirectory>,
    /// Refresh token store behind the router
    pub store: Arc<MemoryRefreshTokenStore>,
    /// Clock shared by every component
    pub clock: Arc<ManualClock>,
    /// Auth configuration the router was built with
    pub auth: AuthConfig,
    hasher: PasswordHasher,
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        let auth = AuthConfig {
            jwt_secret: Some(TEST_JWT_SECRET.to_string()),
            ..AuthConfig::default()
        };
        let clock = Arc::new(ManualClock::default());
        let users = Arc::new(MemoryUserDirectory::default());
        let store = Arc::new(MemoryRefreshTokenStore::new());
        let api_keys = Arc::new(MemoryApiKeys::default());
        let hasher = PasswordHasher::with_params(8, 1, 1).expect("Failed to build hasher");

        api_keys.add(ADMIN_API_KEY, clock.now() + Duration::days(365), true);

        let state = build_state(
            &ServerConfig::default(),
            &auth,
            Collaborators {
                store: store.clone(),
                users: users.clone(),
                passwords: Arc::new(hasher.clone()),
                api_keys,
                clock: clock.clone(),
                database: None,
            },
        )
        .expect("Failed to build state");

        Self {
            router: build_app(state),
            users,
            store,
            clock,
            auth,
            hasher,
        }
    }

    /// Create an active user with the given password and roles
    pub fn create_test_user(&self, email: &str, password: &str, roles: &[&str]) -> Uuid {
        let mut user = account(email, roles);
        user.user.password_hash = self
            .hasher
            .hash_password(password)
            .expect("Failed to hash password");
        let id = user.id();
        self.users.insert(user);
        id
    }

    /// All refresh token records of a user
    pub async fn store_records(&self, user_id: Uuid) -> Vec<RefreshToken> {
        self.store
            .find_by_user_id(user_id)
            .await
            .expect("Failed to read store")
    }

    /// Log in and return the response body
    pub async fn login(&self, email: &str, password: &str) -> Value {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(serde_json::json!({ "email": email, "password": password })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
        response.body
    }

    /// Make a request with an optional bearer token
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let bearer = token.map(|t| format!("Bearer {t}"));
        let headers: Vec<(&str, &str)> = bearer
            .as_deref()
            .map(|b| vec![("Authorization", b)])
            .unwrap_or_default();
        self.request_with_headers(method, path, body, &headers).await
    }

    /// Make a request with arbitrary extra headers
    pub async fn request_with_headers(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        for (name, value) in headers {
            req = req.header(*name, *value);
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// String field of the body
    pub fn str(&self, field: &str) -> &str {
        self.body[field].as_str().unwrap_or_default()
    }
}
