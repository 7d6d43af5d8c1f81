use super::*;
use crate::net::test_support::{spawn_stub, unreachable_client};
use axum::Json;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};
use serde_json::{Value, json};

#[test]
fn parse_body_empty_is_null() {
    let value: Value = parse_body("  ").unwrap();
    assert_eq!(value, Value::Null);
    let opt: Option<u32> = parse_body("").unwrap();
    assert_eq!(opt, None);
}

#[test]
fn parse_body_bad_json_is_decode_error() {
    let err = parse_body::<Value>("{nope").unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[test]
fn endpoint_joins_without_double_slash() {
    let cfg = ClientConfig::default().with_base_url("http://localhost:5000/api/").unwrap();
    let client = ApiClient::new(&cfg).unwrap();
    assert_eq!(client.endpoint("/user"), "http://localhost:5000/api/user");
    assert_eq!(client.endpoint("payments/history"), "http://localhost:5000/api/payments/history");
}

#[tokio::test]
async fn get_json_decodes_success_body() {
    let router = axum::Router::new().route("/api/ping", get(|| async { Json(json!({ "ok": true })) }));
    let client = spawn_stub(router).await;
    let body: Value = client.get_json("/ping").await.unwrap();
    assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn error_status_keeps_backend_message() {
    let router = axum::Router::new().route(
        "/api/thing",
        post(|| async { (StatusCode::CONFLICT, Json(json!({ "message": "Already enrolled" }))) }),
    );
    let client = spawn_stub(router).await;
    let err = client.post_json::<_, Value>("/thing", &json!({})).await.unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert_eq!(err.user_message(), "Already enrolled");
}

#[tokio::test]
async fn unauthorized_maps_to_dedicated_variant() {
    let router = axum::Router::new().route("/api/secret", get(|| async { StatusCode::UNAUTHORIZED }));
    let client = spawn_stub(router).await;
    let err = client.get_json::<Value>("/secret").await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));
}

#[tokio::test]
async fn session_cookie_is_replayed_on_later_requests() {
    let router = axum::Router::new()
        .route(
            "/api/login",
            post(|| async { ([(header::SET_COOKIE, "sid=abc123; Path=/; HttpOnly")], Json(json!({}))) }),
        )
        .route(
            "/api/whoami",
            get(|headers: HeaderMap| async move {
                let cookie = headers
                    .get(header::COOKIE)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_owned();
                Json(json!({ "cookie": cookie }))
            }),
        );
    let client = spawn_stub(router).await;
    let _: Value = client.post_json("/login", &json!({})).await.unwrap();
    let body: Value = client.get_json("/whoami").await.unwrap();
    assert_eq!(body["cookie"], "sid=abc123");
}

#[tokio::test]
async fn connection_refused_is_network_error() {
    let client = unreachable_client().await;
    let err = client.get_json::<Value>("/user").await.unwrap_err();
    assert!(err.is_network(), "expected network error, got {err:?}");
}

#[tokio::test]
async fn get_bytes_returns_raw_body() {
    let router = axum::Router::new().route("/api/file", get(|| async { vec![0x25_u8, 0x50, 0x44, 0x46] }));
    let client = spawn_stub(router).await;
    assert_eq!(client.get_bytes("/file").await.unwrap(), b"%PDF");
}

#[test]
fn path_segment_escapes_reserved_characters() {
    assert_eq!(path_segment("pay_42"), "pay_42");
    assert_eq!(path_segment("a/b?c#d"), "a%2Fb%3Fc%23d");
    assert_eq!(path_segment("with space"), "with%20space");
}

fn session_router() -> axum::Router {
    axum::Router::new()
        .route(
            "/api/login",
            post(|| async { ([(header::SET_COOKIE, "sid=abc; Path=/; HttpOnly")], Json(json!({}))) }),
        )
        .route(
            "/api/user",
            get(|headers: HeaderMap| async move {
                let cookie = headers.get(header::COOKIE).and_then(|v| v.to_str().ok()).unwrap_or_default();
                if cookie.contains("sid=abc") {
                    (StatusCode::OK, Json(json!({ "user": { "_id": "u1", "name": "Asha", "email": "a@b.com" } })))
                } else {
                    (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Not authenticated" })))
                }
            }),
        )
}

#[tokio::test]
async fn session_cookies_empty_before_login() {
    let client = spawn_stub(session_router()).await;
    assert_eq!(client.session_cookies(), None);
}

#[tokio::test]
async fn restored_session_cookie_authenticates_fresh_client() {
    let first = spawn_stub(session_router()).await;
    let _: Value = first.post_json("/login", &json!({})).await.unwrap();
    let saved = first.session_cookies().unwrap();
    assert_eq!(saved, "sid=abc");

    let cfg = ClientConfig::default().with_base_url(first.base_url()).unwrap();
    let fresh = ApiClient::new(&cfg).unwrap();
    let anonymous = fresh.get_json::<Value>("/user").await.unwrap_err();
    assert!(matches!(anonymous, ApiError::Unauthorized { .. }));

    fresh.restore_session_cookies(&saved).unwrap();
    let body: Value = fresh.get_json("/user").await.unwrap();
    assert_eq!(body["user"]["_id"], "u1");
}

#[tokio::test]
async fn restore_ignores_blank_and_malformed_pairs() {
    let client = spawn_stub(session_router()).await;
    client.restore_session_cookies(" ; junk ; sid=abc ;").unwrap();
    assert_eq!(client.session_cookies().as_deref(), Some("sid=abc"));
}
