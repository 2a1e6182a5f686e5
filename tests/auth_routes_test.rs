// ABOUTME: Integration tests for the HTTP auth boundary
// ABOUTME: Validates status-code mapping and the plain-text logout confirmation

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use atlas_gym_server::{
    auth::{generate_jwt_secret, TokenCodec},
    database::Database,
    lockout::AllowAllGuard,
    routes::{auth::AuthRoutes, health::HealthRoutes, members::MemberRoutes, AppState},
    sessions::SessionManager,
};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use std::sync::Arc;
use tower::ServiceExt;

async fn test_app() -> Router {
    let database = Database::new("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    let secret = generate_jwt_secret().unwrap();
    let codec = TokenCodec::new(&secret, 1, 24);
    let sessions = SessionManager::new(database, codec, Arc::new(AllowAllGuard));
    let state = Arc::new(AppState { sessions });

    Router::new()
        .merge(AuthRoutes::routes(state.clone()))
        .merge(MemberRoutes::routes(state))
        .merge(HealthRoutes::routes())
}

fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_signup_returns_created_with_allocated_username() {
    let app = test_app().await;

    let response = app
        .oneshot(json_request(
            "/auth/signup",
            serde_json::json!({
                "first_name": "Harry",
                "last_name": "Potter",
                "password": "alohomora"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_string(response).await;
    assert!(body.contains("Harry.Potter.1"));
    assert!(body.contains("access_token"));
}

#[tokio::test]
async fn test_login_wrong_password_is_unauthorized() {
    let app = test_app().await;
    app.clone()
        .oneshot(json_request(
            "/auth/signup",
            serde_json::json!({
                "first_name": "Harry",
                "last_name": "Potter",
                "password": "alohomora"
            }),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(json_request(
            "/auth/login",
            serde_json::json!({
                "username": "Harry.Potter.1",
                "password": "wrong"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_unknown_user_is_not_found() {
    let app = test_app().await;

    let response = app
        .oneshot(json_request(
            "/auth/login",
            serde_json::json!({
                "username": "Nobody.Here.1",
                "password": "pw"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_authenticate_unknown_user_is_unauthorized() {
    let app = test_app().await;

    let response = app
        .oneshot(json_request(
            "/auth/authenticate",
            serde_json::json!({
                "username": "Nobody.Here.1",
                "password": "pw"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_without_bearer_prefix_is_bad_request() {
    let app = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/refresh")
                .header("authorization", "token-without-bearer-prefix")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response).await;
    assert!(body.contains("AUTH_MALFORMED"));
}

#[tokio::test]
async fn test_logout_always_confirms_in_plain_text() {
    let app = test_app().await;

    // A token the store has never seen still logs out successfully
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/logout")
                .header("authorization", "Bearer never-issued")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Logout successful");
}

#[tokio::test]
async fn test_trainer_registration_returns_generated_password() {
    let app = test_app().await;

    let response = app
        .oneshot(json_request(
            "/trainers",
            serde_json::json!({
                "first_name": "Minerva",
                "last_name": "McGonagall"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: serde_json::Value =
        serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["username"], "Minerva.McGonagall.1");
    assert_eq!(body["password"].as_str().unwrap().len(), 10);
}

#[tokio::test]
async fn test_profile_requires_valid_token() {
    let app = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/profile")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
