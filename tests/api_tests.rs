//! HTTP boundary tests: uniform failure shapes on the auth routes and the
//! full credential flows end-to-end.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use identra::config::Config;
use std::sync::Arc;
use tower::ServiceExt;

async fn spawn_app() -> (Arc<identra::api::AppState>, Router) {
    let db_path =
        std::env::temp_dir().join(format!("identra-api-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    // Cheap hashing and a short descriptor keep the suite quick.
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config.security.facial_descriptor_len = 4;

    let state = identra::api::create_app_state_from_config(config)
        .await
        .expect("failed to create app state");
    let router = identra::api::router(state.clone());
    (state, router)
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn put_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_user(app: &Router, email: &str, password: &str) -> i64 {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/users",
            serde_json::json!({ "email": email, "password": password }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["data"]["id"].as_i64().expect("created user id")
}

#[tokio::test]
async fn health_reports_ok() {
    let (_, app) = spawn_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/system/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn create_and_login_flow() {
    let (_, app) = spawn_app().await;
    create_user(&app, "ada@example.com", "orbital-mechanics").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            serde_json::json!({ "email": "Ada@Example.com", "password": "orbital-mechanics" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["email"], "ada@example.com");
    assert!(body["data"]["last_login"].is_string());
    assert!(body["data"].get("password_hash").is_none());

    // Second create with the same email collides.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/users",
            serde_json::json!({ "email": "ADA@example.com", "password": "other-password" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_failures_share_one_shape() {
    let (_, app) = spawn_app().await;
    create_user(&app, "real@example.com", "orbital-mechanics").await;

    let wrong_password = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            serde_json::json!({ "email": "real@example.com", "password": "wrong-password" }),
        ))
        .await
        .unwrap();

    let unknown_account = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            serde_json::json!({ "email": "ghost@example.com", "password": "wrong-password" }),
        ))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_account.status(), StatusCode::UNAUTHORIZED);

    // Byte-identical bodies: nothing distinguishes "no such account".
    let a = body_json(wrong_password).await;
    let b = body_json(unknown_account).await;
    assert_eq!(a, b);
}

#[tokio::test]
async fn forgot_password_never_reveals_existence() {
    let (_, app) = spawn_app().await;
    create_user(&app, "real@example.com", "orbital-mechanics").await;

    let known = app
        .clone()
        .oneshot(post_json(
            "/api/auth/forgot-password",
            serde_json::json!({ "email": "real@example.com" }),
        ))
        .await
        .unwrap();
    let unknown = app
        .clone()
        .oneshot(post_json(
            "/api/auth/forgot-password",
            serde_json::json!({ "email": "ghost@example.com" }),
        ))
        .await
        .unwrap();

    assert_eq!(known.status(), StatusCode::OK);
    assert_eq!(unknown.status(), StatusCode::OK);
    assert_eq!(body_json(known).await, body_json(unknown).await);
}

#[tokio::test]
async fn reset_password_end_to_end() {
    let (state, app) = spawn_app().await;
    let id = create_user(&app, "forgetful@example.com", "old-password").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/forgot-password",
            serde_json::json!({ "email": "forgetful@example.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The notification transport is out of scope; pull the token from the
    // store the way an operator would.
    let token = state
        .store()
        .token_repo()
        .latest_for_user(i32::try_from(id).unwrap())
        .await
        .unwrap()
        .expect("token should exist")
        .token;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/reset-password",
            serde_json::json!({ "token": token, "new_password": "brand-new-password" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // New password works, old one does not.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            serde_json::json!({ "email": "forgetful@example.com", "password": "brand-new-password" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            serde_json::json!({ "email": "forgetful@example.com", "password": "old-password" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The token is single-use.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/reset-password",
            serde_json::json!({ "token": token, "new_password": "yet-another-password" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn facial_enrollment_and_method_switch() {
    let (_, app) = spawn_app().await;
    let id = create_user(&app, "face@example.com", "orbital-mechanics").await;

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/users/{id}/facial"),
            serde_json::json!({ "descriptor": [0.1, 0.2, 0.3, 0.4], "metadata": "kiosk-3" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Facial login works against the enrolled descriptor.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            serde_json::json!({
                "email": "face@example.com",
                "method": "facial",
                "descriptor": [0.1, 0.2, 0.3, 0.41]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // A distant capture is a uniform 401.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            serde_json::json!({
                "email": "face@example.com",
                "method": "facial",
                "descriptor": [9.0, 9.0, 9.0, 9.0]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Switch the authoritative method to facial.
    let response = app
        .clone()
        .oneshot(put_json(
            &format!("/api/users/{id}/login-method"),
            serde_json::json!({ "method": "facial" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The switch is non-destructive: the retained password still verifies.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            serde_json::json!({ "email": "face@example.com", "password": "orbital-mechanics" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn facial_login_without_enrollment_is_a_uniform_401() {
    let (_, app) = spawn_app().await;
    create_user(&app, "noface@example.com", "orbital-mechanics").await;

    // Existing account that never enrolled a facial credential.
    let not_enrolled = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            serde_json::json!({
                "email": "noface@example.com",
                "method": "facial",
                "descriptor": [0.1, 0.2, 0.3, 0.4]
            }),
        ))
        .await
        .unwrap();

    // Account that does not exist at all.
    let unknown = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            serde_json::json!({
                "email": "ghost@example.com",
                "method": "facial",
                "descriptor": [0.1, 0.2, 0.3, 0.4]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(not_enrolled.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);

    // Byte-identical bodies: the route reveals neither existence nor which
    // credentials an account has configured.
    assert_eq!(body_json(not_enrolled).await, body_json(unknown).await);
}

#[tokio::test]
async fn switching_without_enrollment_conflicts() {
    let (_, app) = spawn_app().await;
    let id = create_user(&app, "noface@example.com", "orbital-mechanics").await;

    let response = app
        .clone()
        .oneshot(put_json(
            &format!("/api/users/{id}/login-method"),
            serde_json::json!({ "method": "facial" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn validation_failures() {
    let (state, app) = spawn_app().await;

    // Unparseable email.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/users",
            serde_json::json!({ "email": "not-an-email" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Weak password fails before the record is created.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/users",
            serde_json::json!({ "email": "weak@example.com", "password": "short" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(state.store().list_users().await.unwrap().is_empty());

    // Unknown login method.
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            serde_json::json!({ "email": "a@b.c", "method": "retina", "password": "x" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown user id on the admin surface is a diagnostic 404.
    let response = app
        .clone()
        .oneshot(put_json(
            "/api/users/9999/password",
            serde_json::json!({ "password": "long-enough-password" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
