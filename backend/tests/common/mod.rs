//! Shared helpers for router-level tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use logistics_backend::{create_app, services::auth::issue_session_token, AppState, Config};
use serde_json::Value;
use shared::{Role, User};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

/// App backed by a pool that never connects unless a handler queries it
pub fn test_app() -> (Router, Arc<Config>) {
    let config = Arc::new(Config::default());
    let db = PgPoolOptions::new()
        .connect_lazy(&config.database.url)
        .expect("lazy pool");
    let state = AppState {
        db,
        config: config.clone(),
    };
    (create_app(state), config)
}

/// State connected to `DATABASE_URL` with migrations applied
pub async fn db_state() -> AppState {
    let mut config = Config::default();
    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database.url = url;
    }
    let db = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await
        .expect("database connection");
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("migrations");
    AppState {
        db,
        config: Arc::new(config),
    }
}

/// App connected to `DATABASE_URL` with migrations applied
pub async fn db_app() -> Router {
    create_app(db_state().await)
}

/// Session token for a user that only exists in the token claims
pub fn token_for(config: &Config, user_id: i64, role: Role) -> String {
    let user = User {
        id: user_id,
        name: "Test User".to_string(),
        email: format!("user{}@example.com", user_id),
        password_hash: String::new(),
        role,
        phone_number: None,
        address: None,
        created_at: Utc::now(),
    };
    issue_session_token(&user, &config.jwt.secret, config.jwt.token_expiry).expect("token")
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

/// Send a request and decode the JSON body (`Null` when empty)
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, _, body) = send_with_headers(app, request).await;
    (status, body)
}

pub async fn send_with_headers(
    app: &Router,
    request: Request<Body>,
) -> (StatusCode, HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

/// Value of the `session` cookie in a login response
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| v.strip_prefix("session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}
