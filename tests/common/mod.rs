use std::sync::Arc;

use adult_education::{
    app::build_app,
    config::{AppConfig, JwtConfig},
    state::AppState,
    store::MemoryStore,
};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".into(),
        max_connections: 1,
        jwt: JwtConfig {
            secret: "integration-secret".into(),
            issuer: "adult-education".into(),
            audience: "adult-education-users".into(),
            ttl_minutes: None,
        },
    }
}

pub fn setup_test_app() -> (Router, AppState) {
    setup_test_app_with(test_config())
}

pub fn setup_test_app_with(config: AppConfig) -> (Router, AppState) {
    let state = AppState::from_parts(Arc::new(MemoryStore::new()), Arc::new(config));
    (build_app(state.clone()), state)
}

/// Sends one request and returns status plus the parsed JSON body (Null when empty).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&v).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

#[allow(dead_code)]
pub async fn signup_and_login(app: &Router, username: &str, password: &str, role: &str) -> String {
    let (status, _) = send(
        app,
        "POST",
        "/api/signup",
        None,
        Some(serde_json::json!({ "username": username, "password": password, "role": role })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        "POST",
        "/api/login",
        None,
        Some(serde_json::json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}
