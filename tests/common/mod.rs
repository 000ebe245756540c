#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use pos_api::{
    config::AppConfig,
    db::{self, DbConfig},
    repositories::{DbUserRepository, UserFields, UserRepository},
    AppState,
};
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "Zq8v1Lm3Xp0Rt6Wy2Bn9Kd4Hs7Jf5Gc1Ve8Ua3Ti0Oe6Pw2Qr9Sx4Yz7Nm5Lk1Hj";

/// Helper harness for spinning up the full router over an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            TEST_SECRET.to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );

        // One pooled connection keeps the in-memory database alive and shared.
        let pool = db::establish_connection_with_config(&DbConfig {
            url: cfg.database_url.clone(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        })
        .await
        .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = pos_api::build_router(state.clone());

        Self { router, state }
    }

    pub fn users(&self) -> DbUserRepository {
        DbUserRepository::new(self.state.db.clone())
    }

    /// Create an account directly and return a bearer token for it.
    pub async fn token_for(&self, email: &str, is_staff: bool) -> String {
        let account = self
            .users()
            .create_user(
                email,
                "testpass123",
                UserFields {
                    name: Some("Test User".to_string()),
                    is_staff,
                    ..Default::default()
                },
            )
            .await
            .expect("seed user for tests");
        self.state
            .auth
            .issue_token(&account)
            .expect("issue token for tests")
    }

    pub async fn staff_token(&self) -> String {
        self.token_for("manager@example.com", true).await
    }

    pub async fn cashier_token(&self) -> String {
        self.token_for("cashier@example.com", false).await
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}
