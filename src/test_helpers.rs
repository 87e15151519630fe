//! In-process fake backend for HTTP tests.
//!
//! Mirrors the backend routes the client talks to. Login sets a `session`
//! cookie and the resource routes reject requests without it, so tests can
//! observe cookie propagation.

use axum::Router;
use axum::extract::Path;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};

use crate::config::ClientConfig;

pub const EMAIL: &str = "a@b.com";
pub const PASSWORD: &str = "secret";
pub const SESSION_COOKIE: &str = "session=abc123";

/// Routines exactly as the fake backend returns them.
pub fn routines_fixture() -> Value {
    json!([
        { "id": 1, "name": "daily claim", "steps": [{ "action": "click", "selector": "#claim" }], "extra": null },
        { "id": 2, "name": "weekly", "description": "sunday run", "steps": [] }
    ])
}

/// Schedules exactly as the fake backend returns them.
pub fn schedules_fixture() -> Value {
    json!([
        { "id": 5, "routine_id": 1, "interval_seconds": 3600, "is_active": true, "last_run": null }
    ])
}

/// Full backend router mounted at `/`.
pub fn backend() -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/logout", post(logout))
        .route("/routines", get(list_routines).post(create_routine))
        .route("/routines/{id}/start", post(start_routine))
        .route("/routines/{id}/stop", post(stop_routine))
        .route("/schedules", get(list_schedules).post(create_schedule))
}

/// Router where every route answers with a failure.
pub fn failing_backend() -> Router {
    Router::new()
        .route("/auth/logout", post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }))
        .route("/schedules", get(|| async { (StatusCode::BAD_GATEWAY, "<html>bad gateway</html>") }))
        .route("/routines", get(|| async { Json(json!({ "not": "an array" })) }))
}

/// Serve `router` on an ephemeral port and return its base URL.
pub async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// A base URL nothing listens on.
pub async fn dead_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn config_for(base_url: &str) -> ClientConfig {
    ClientConfig::new(base_url).unwrap()
}

// =============================================================================
// HANDLERS
// =============================================================================

fn has_session(headers: &HeaderMap) -> bool {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .any(|pair| pair.trim() == SESSION_COOKIE)
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn unauthorized() -> Response {
    detail(StatusCode::UNAUTHORIZED, "Not authenticated")
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["email"] == EMAIL && body["password"] == PASSWORD {
        let cookie = format!("{SESSION_COOKIE}; Path=/; HttpOnly");
        let payload = json!({
            "access_token": "jwt-token",
            "token_type": "bearer",
            "user": { "id": 1, "email": EMAIL, "is_active": true }
        });
        ([(SET_COOKIE, cookie)], Json(payload)).into_response()
    } else if body["email"] == "silent@b.com" {
        (StatusCode::UNAUTHORIZED, Json(json!({}))).into_response()
    } else {
        detail(StatusCode::UNAUTHORIZED, "Invalid credentials")
    }
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["email"] == EMAIL {
        return detail(StatusCode::BAD_REQUEST, "Email already registered");
    }
    if body["email"] == "" {
        let errors = json!([{ "loc": ["body", "email"], "msg": "value is not a valid email address" }]);
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "detail": errors }))).into_response();
    }
    Json(json!({ "id": 2, "email": body["email"], "is_active": true })).into_response()
}

async fn logout() -> Response {
    ([(SET_COOKIE, "session=; Path=/; Max-Age=0")], Json(json!({ "message": "Logged out" }))).into_response()
}

async fn list_routines(headers: HeaderMap) -> Response {
    if !has_session(&headers) {
        return unauthorized();
    }
    Json(routines_fixture()).into_response()
}

async fn create_routine(headers: HeaderMap, Json(mut body): Json<Value>) -> Response {
    if !has_session(&headers) {
        return unauthorized();
    }
    body["id"] = json!(10);
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn start_routine(headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if !has_session(&headers) {
        return unauthorized();
    }
    if id == 404 {
        return detail(StatusCode::NOT_FOUND, "Routine not found");
    }
    Json(json!({})).into_response()
}

async fn stop_routine(headers: HeaderMap, Path(_id): Path<i64>) -> Response {
    if !has_session(&headers) {
        return unauthorized();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn list_schedules(headers: HeaderMap) -> Response {
    if !has_session(&headers) {
        return unauthorized();
    }
    Json(schedules_fixture()).into_response()
}

async fn create_schedule(headers: HeaderMap, Json(mut body): Json<Value>) -> Response {
    if !has_session(&headers) {
        return unauthorized();
    }
    if body["interval_seconds"].as_i64().is_some_and(|s| s <= 0) {
        return detail(StatusCode::UNPROCESSABLE_ENTITY, "interval_seconds must be positive");
    }
    body["id"] = json!(20);
    (StatusCode::CREATED, Json(body)).into_response()
}
