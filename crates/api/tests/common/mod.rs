#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use pms_api::auth::password::hash_password;
use pms_api::config::ServerConfig;
use pms_api::router::build_app_router;
use pms_api::state::AppState;
use pms_core::session::{SessionMetrics, SessionResolver};
use pms_core::types::DbId;
use pms_db::models::employee::CreateEmployee;
use pms_db::repositories::{EmployeeRepo, RoleRepo};
use pms_db::session_store::PgSessionStore;
use sqlx::PgPool;
use tower::ServiceExt;

/// Password given to every employee created through [`create_employee`].
pub const PASSWORD: &str = "timesheet-pass";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5002".to_string()],
        request_timeout_secs: 30,
        cookie_secure: false,
        session_cleanup_secs: 3600,
        bootstrap_admin: None,
    }
}

/// Build the full application router backed by `pool`, with the same
/// middleware stack the binary uses.
pub async fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_sessions(pool).await.0
}

/// Like [`build_test_app`], also returning the session resolver.
pub async fn build_test_app_with_sessions(pool: PgPool) -> (Router, Arc<SessionResolver>) {
    let config = test_config();
    let sessions = Arc::new(
        SessionResolver::start(
            Arc::new(PgSessionStore::new(pool.clone())),
            Arc::new(SessionMetrics::default()),
        )
        .await,
    );
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        sessions: Arc::clone(&sessions),
    };
    (build_app_router(state, &config), sessions)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
    cookie: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    send(app, Method::GET, uri, None, cookie).await
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    body: serde_json::Value,
    cookie: Option<&str>,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), cookie).await
}

pub async fn put_json(
    app: &Router,
    uri: &str,
    body: serde_json::Value,
    cookie: Option<&str>,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body), cookie).await
}

pub async fn delete(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    send(app, Method::DELETE, uri, None, cookie).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// The `Set-Cookie` header of a response, if any.
pub fn set_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string())
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert an active employee with the named seeded role and [`PASSWORD`].
pub async fn create_employee(pool: &PgPool, name: &str, role: &str) -> DbId {
    let role = RoleRepo::find_by_name(pool, role)
        .await
        .unwrap()
        .unwrap_or_else(|| panic!("role {role} should be seeded"));
    EmployeeRepo::create(
        pool,
        &CreateEmployee {
            name: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: hash_password(PASSWORD).unwrap(),
            role_id: role.id,
            department: None,
        },
    )
    .await
    .unwrap()
    .id
}

/// Log in through the API and return the `Cookie` header value to send on
/// later requests.
pub async fn login(app: &Router, name: &str) -> String {
    let response = post_json(
        app,
        "/api/auth/login",
        serde_json::json!({ "username": name, "password": PASSWORD }),
        None,
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let header = set_cookie(&response).expect("login should set a cookie");
    header
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}
