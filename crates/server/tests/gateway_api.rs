//! Router-level tests for the gateway endpoints.
//!
//! The store points at a port nothing listens on, so every request that
//! reaches the database fails fast. That makes the validation paths
//! observable: a 400 here means the request was rejected before any
//! database call, while a database-bound request surfaces as a 500.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use server::{ServerConfig, ServerState, build_router};
use tower::ServiceExt;

const ADMIN_SECRET: &str = "backing-secret";

fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.database.host = "127.0.0.1".to_string();
    config.database.port = 1;
    config.database.password = ADMIN_SECRET.to_string();
    config.database.acquire_timeout_secs = 1;
    config
}

fn test_router() -> Router {
    let state = ServerState::new(test_config()).expect("Failed to create test state");
    build_router(Arc::new(state)).expect("Failed to build router")
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = test_router().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn get(uri: &str) -> (StatusCode, Value) {
    send(Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn with_json(method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
    send(
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

async fn delete(uri: &str) -> (StatusCode, Value) {
    send(
        Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

fn detail(body: &Value) -> &str {
    body["detail"].as_str().unwrap_or_default()
}

// ── Table allow-list ───────────────────────────────────────────────────

#[tokio::test]
async fn fetch_rejects_tables_outside_allow_list() {
    for table in ["users", "CPUS", "information_schema.tables", "cpus%3B"] {
        let (status, body) = get(&format!("/fetch/{table}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "table {table}");
        assert_eq!(detail(&body), "Invalid table name");
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    let (status, _) = get("/fetch/users/1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_paths_exclude_builds_and_unknown_tables() {
    let (status, body) = with_json(Method::POST, "/admin/builds", json!({"build_name": "x"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(detail(&body), "Invalid table name");

    let (status, _) = with_json(Method::PUT, "/admin/users/1", json!({"name": "x"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = delete("/admin/builds/1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) =
        with_json(Method::PATCH, "/admin/accounts/1/price", json!({"value": 1})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn category_endpoints_enforce_allow_list() {
    let (status, _) = with_json(Method::POST, "/parts/compatible/builds", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = with_json(Method::POST, "/parts/compatible/fans", json!({"cpu_id": 1})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get("/search/users?keyword=ryzen").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get("/compare/builds/1,2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get("/compatibility/cpu/1/fan/2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_inputs_are_rejected_before_the_database() {
    let (status, body) = get("/compare/cpus/1,abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(detail(&body).contains("comma-separated"));

    let (status, body) = get("/fetch/cpus?page=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(detail(&body), "page must be at least 1");

    let (status, _) = get("/fetch/cpus?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get("/fetch/cpus/not-a-number").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = with_json(Method::POST, "/psus/compatibility?gpu_id=1", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn extractor_failures_use_json_error_body() {
    let (status, body) = with_json(
        Method::POST,
        "/builds",
        json!({"build_name": "x", "cpu_id": "abc"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(!detail(&body).is_empty());

    let (status, body) = get("/builds/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(detail(&body).contains("abc"));

    let (status, body) = get("/search/cpus?min_price=cheap").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn body_without_json_content_type_is_bad_request() {
    let (status, body) = send(
        Request::post("/auth/login")
            .body(Body::from(r#"{"username":"a","password":"b"}"#))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(detail(&body).contains("Content-Type"));

    let (status, body) = send(
        Request::post("/builds")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

// ── Admin bodies ───────────────────────────────────────────────────────

#[tokio::test]
async fn admin_create_with_only_credentials_is_rejected() {
    let (status, body) = with_json(
        Method::POST,
        "/admin/cpus",
        json!({"admin_username": "admin", "admin_password": "pw"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(detail(&body), "No columns supplied for cpus");
}

#[tokio::test]
async fn attribute_update_requires_value() {
    let (status, body) = with_json(Method::PATCH, "/admin/cpus/1/price", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(detail(&body), "value is required in request body");

    let (status, _) = with_json(Method::PATCH, "/admin/cpus/1/price", json!({"value": null})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn attribute_update_rejects_non_identifier_columns() {
    let (status, body) =
        with_json(Method::PATCH, "/admin/gpus/3/tdp-w", json!({"value": 220})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(detail(&body), "Column 'tdp-w' does not exist in table 'gpus'");
}

// ── Accounts ───────────────────────────────────────────────────────────

#[tokio::test]
async fn login_requires_both_fields() {
    let (status, body) = with_json(Method::POST, "/auth/login", json!({"username": "alice"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(detail(&body), "username and password required");

    let (status, _) = with_json(Method::POST, "/auth/login", json!({"password": "x"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_with_rejected_credentials_is_unauthorized() {
    let (status, body) = with_json(
        Method::POST,
        "/auth/login",
        json!({"username": "alice", "password": "wrong"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(detail(&body), "Invalid credentials");

    // The admin fallback only applies to the service secret.
    let (status, _) = with_json(
        Method::POST,
        "/auth/login",
        json!({"username": "admin", "password": "guess"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_login_falls_back_to_service_secret() {
    let (status, body) = with_json(
        Method::POST,
        "/auth/login",
        json!({"username": "admin", "password": ADMIN_SECRET}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "username": "admin", "role": "admin"})
    );
}

#[tokio::test]
async fn service_secret_does_not_admit_other_users() {
    let (status, _) = with_json(
        Method::POST,
        "/auth/login",
        json!({"username": "alice", "password": ADMIN_SECRET}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signup_rejects_reserved_admin_name_in_any_case() {
    for name in ["admin", "ADMIN", "Admin", "aDmIn"] {
        let (status, body) = with_json(
            Method::POST,
            "/auth/signup",
            json!({"username": name, "pwd": "anything"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "name {name}");
        assert_eq!(detail(&body), "Cannot create admin user via signup");
    }
}

#[tokio::test]
async fn signup_requires_username_and_pwd() {
    let (status, body) = with_json(Method::POST, "/auth/signup", json!({"username": "bob"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(detail(&body), "username and pwd required");
}

#[tokio::test]
async fn create_user_validates_fields_then_privileges() {
    let (status, body) = with_json(
        Method::POST,
        "/users/create",
        json!({"username": "bob", "pwd": "pw"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(detail(&body), "admin_username and admin_password required");

    let (status, body) = with_json(
        Method::POST,
        "/users/create",
        json!({"admin_username": "admin", "admin_password": "pw"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(detail(&body), "username and pwd required");

    let (status, body) = with_json(
        Method::POST,
        "/users/create",
        json!({
            "admin_username": "admin",
            "admin_password": "not-accepted",
            "username": "bob",
            "pwd": "pw",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(detail(&body), "Admin privileges required");
}

// ── Database unavailable ───────────────────────────────────────────────

#[tokio::test]
async fn database_failures_on_reads_are_server_errors() {
    for uri in [
        "/fetch/builds?page=2&limit=10",
        "/fetch/cpus/1",
        "/builds/details/all",
        "/parts/counts",
        "/find/ryzen",
        "/power/1",
        "/ready",
    ] {
        let (status, body) = get(uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "uri {uri}");
        assert_eq!(body["error"]["code"], "DATABASE_ERROR");
        assert!(!detail(&body).is_empty());
    }
}

// ── Service surface ────────────────────────────────────────────────────

#[tokio::test]
async fn health_does_not_need_the_database() {
    let (status, body) = get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "buildapc-server");
}

#[tokio::test]
async fn metrics_without_recorder_reports_uptime() {
    let (status, body) = get("/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn unknown_routes_return_json_not_found() {
    let (status, body) = get("/no/such/route").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn responses_carry_request_id() {
    let response = test_router()
        .oneshot(
            Request::get("/health")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-42");

    let response = test_router()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn cors_allows_configured_origin_with_credentials() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/auth/login")
                .header(header::ORIGIN, "http://localhost:3000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}

#[tokio::test]
async fn cors_ignores_other_origins() {
    let response = test_router()
        .oneshot(
            Request::get("/health")
                .header(header::ORIGIN, "http://evil.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(
        !response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
    );
}
