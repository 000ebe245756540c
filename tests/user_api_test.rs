//! Account endpoints: creation, token issuance and the caller's own profile.

mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use pos_api::repositories::UserRepository;
use serde_json::json;

fn signup() -> serde_json::Value {
    json!({
        "email": "test@example.com",
        "password": "testpass123",
        "name": "Test Name",
    })
}

async fn issue_token(app: &TestApp, email: &str, password: &str) -> String {
    let response = app
        .request(
            Method::POST,
            "/user/token/",
            Some(json!({ "email": email, "password": password })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    body["token"].as_str().expect("token field").to_string()
}

#[tokio::test]
async fn create_user_returns_public_fields_only() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::POST, "/user/create/", Some(signup()), None)
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["email"], "test@example.com");
    assert_eq!(body["name"], "Test Name");
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());

    let stored = app
        .users()
        .find_by_email("test@example.com")
        .await
        .unwrap()
        .expect("account stored");
    assert!(stored.check_password("testpass123"));
    assert!(!stored.is_staff);
}

#[tokio::test]
async fn create_user_normalizes_email_domain() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/user/create/",
            Some(json!({ "email": "Test2@Example.com", "password": "testpass123", "name": "T" })),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response_json(response).await["email"], "Test2@example.com");
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = TestApp::new().await;

    let first = app
        .request(Method::POST, "/user/create/", Some(signup()), None)
        .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .request(Method::POST, "/user/create/", Some(signup()), None)
        .await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn short_password_is_rejected_and_not_stored() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/user/create/",
            Some(json!({ "email": "test@example.com", "password": "pw", "name": "Test" })),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert!(body["details"]["password"].is_array());
    assert!(app
        .users()
        .find_by_email("test@example.com")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/user/create/",
            Some(json!({ "password": "testpass123" })),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn token_is_issued_for_valid_credentials() {
    let app = TestApp::new().await;
    app.request(Method::POST, "/user/create/", Some(signup()), None)
        .await;

    let token = issue_token(&app, "test@example.com", "testpass123").await;
    assert!(!token.is_empty());

    let stored = app
        .users()
        .find_by_email("test@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(stored.last_login.is_some());
}

#[tokio::test]
async fn token_is_withheld_for_bad_credentials() {
    let app = TestApp::new().await;
    app.request(Method::POST, "/user/create/", Some(signup()), None)
        .await;

    let cases = [
        json!({ "email": "test@example.com", "password": "wrong" }),
        json!({ "email": "test@example.com", "password": "" }),
        json!({ "email": "test@example.com" }),
        json!({ "email": "nobody@example.com", "password": "testpass123" }),
    ];

    for payload in cases {
        let response = app
            .request(Method::POST, "/user/token/", Some(payload.clone()), None)
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{payload}");
        let body = response_json(response).await;
        assert!(body.get("token").is_none(), "{payload}");
    }
}

#[tokio::test]
async fn profile_requires_authentication() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/user/me/", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .request(Method::GET, "/user/me/", None, Some("not-a-token"))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_is_returned_for_the_token_holder() {
    let app = TestApp::new().await;
    app.request(Method::POST, "/user/create/", Some(signup()), None)
        .await;
    let token = issue_token(&app, "test@example.com", "testpass123").await;

    let response = app
        .request(Method::GET, "/user/me/", None, Some(&token))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response_json(response).await,
        json!({ "name": "Test Name", "email": "test@example.com" })
    );
}

#[tokio::test]
async fn post_to_profile_is_not_allowed() {
    let app = TestApp::new().await;
    let token = app.cashier_token().await;

    for payload in [None, Some(json!({})), Some(json!({ "name": "x" }))] {
        let response = app
            .request(Method::POST, "/user/me/", payload, Some(&token))
            .await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body = response_json(response).await;
        assert_eq!(body["error"], "Method Not Allowed");
        assert_eq!(body["message"], "Method not allowed: \"POST\"");
    }
}

#[tokio::test]
async fn patch_profile_updates_name_and_password() {
    let app = TestApp::new().await;
    app.request(Method::POST, "/user/create/", Some(signup()), None)
        .await;
    let token = issue_token(&app, "test@example.com", "testpass123").await;

    let response = app
        .request(
            Method::PATCH,
            "/user/me/",
            Some(json!({ "name": "Updated name", "password": "newpassword123" })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["name"], "Updated name");

    let stored = app
        .users()
        .find_by_email("test@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "Updated name");
    assert!(stored.check_password("newpassword123"));
    assert!(!stored.check_password("testpass123"));
}

#[tokio::test]
async fn deactivated_account_token_is_rejected() {
    let app = TestApp::new().await;
    let token = app.cashier_token().await;

    let account = app
        .users()
        .find_by_email("cashier@example.com")
        .await
        .unwrap()
        .unwrap();
    let mut active: pos_api::auth::user::ActiveModel = account.into();
    active.is_active = sea_orm::Set(false);
    app.users().update(active).await.unwrap();

    let response = app
        .request(Method::GET, "/user/me/", None, Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn every_response_carries_a_request_id() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health", None, None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}
