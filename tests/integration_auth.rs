mod common;

use adult_education::store::{CredentialStore, Role};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{send, setup_test_app, signup_and_login};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_signup_success_does_not_echo_secrets() {
    let (app, _) = setup_test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/signup",
        None,
        Some(json!({ "username": "alice", "password": "pw1", "role": "teacher" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "message": "User created successfully" }));
}

#[tokio::test]
async fn test_signup_duplicate_username_conflicts() {
    let (app, state) = setup_test_app();
    let first = json!({ "username": "alice", "password": "pw1", "role": "teacher" });
    let second = json!({ "username": "alice", "password": "pw2", "role": "student" });

    let (status, _) = send(&app, "POST", "/api/signup", None, Some(first)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "POST", "/api/signup", None, Some(second)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "User already exists");

    let alice = state
        .store
        .find_user_by_username("alice")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(alice.role, Role::Teacher);
}

#[tokio::test]
async fn test_signup_missing_or_invalid_fields() {
    let (app, _) = setup_test_app();

    for body in [
        json!({ "username": "a", "password": "pw" }),
        json!({ "username": "", "password": "pw", "role": "student" }),
        json!({}),
    ] {
        let (status, res) = send(&app, "POST", "/api/signup", None, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(res["message"], "Missing username, password, or role");
    }

    let (status, res) = send(
        &app,
        "POST",
        "/api/signup",
        None,
        Some(json!({ "username": "a", "password": "pw", "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(res["message"], "Invalid role");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (app, _) = setup_test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/signup",
        None,
        Some(json!({ "username": 7, "password": "pw", "role": "student" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_returns_token_with_stored_claims() {
    let (app, state) = setup_test_app();
    let token = signup_and_login(&app, "alice", "pw1", "teacher").await;

    let claims = state.keys.verify(&token).expect("token verifies");
    assert_eq!(claims.username, "alice");
    assert_eq!(claims.role, Role::Teacher);
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let (app, _) = setup_test_app();
    signup_and_login(&app, "alice", "pw1", "teacher").await;

    let (status, wrong_pw) = send(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "username": "alice", "password": "pw2" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(wrong_pw.get("token").is_none());

    let (status, unknown) = send(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "username": "nobody", "password": "pw1" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw, unknown);
}

#[tokio::test]
async fn test_login_missing_fields() {
    let (app, _) = setup_test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "username": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing username or password");
}

#[tokio::test]
async fn test_health() {
    let (app, _) = setup_test_app();
    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
