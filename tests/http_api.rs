//! Router-level tests driving the HTTP API end to end.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use tower::ServiceExt;

use focus_timer::{api::create_router, auth::INIT_DATA_HEADER, state::AppState};

type HmacSha256 = Hmac<Sha256>;

const TOKEN: &str = "7000000001:AAfake-token-for-tests";
const USER: i64 = 42;

fn router() -> Router {
    let state = Arc::new(AppState::new(5002, "127.0.0.1".to_string(), TOKEN, 3600));
    create_router(state)
}

/// Build a fresh signed payload the way the chat platform would.
fn signed_init_data(user_id: i64) -> String {
    let auth_date = Utc::now().timestamp();
    let user_json = format!(r#"{{"id":{user_id},"first_name":"Ada"}}"#);
    let fields = [
        ("auth_date", auth_date.to_string()),
        ("query_id", "AAH1234".to_string()),
        ("user", user_json),
    ];

    let mut sorted: Vec<_> = fields.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);
    let check_string = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("\n");

    let mut mac = HmacSha256::new_from_slice(b"WebAppData").unwrap();
    mac.update(TOKEN.as_bytes());
    let secret = mac.finalize().into_bytes();

    let mut mac = HmacSha256::new_from_slice(&secret).unwrap();
    mac.update(check_string.as_bytes());
    let hash = hex::encode(mac.finalize().into_bytes());

    fields
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .chain(std::iter::once(format!("hash={hash}")))
        .collect::<Vec<_>>()
        .join("&")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, init_data: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(init_data) = init_data {
        builder = builder.header(INIT_DATA_HEADER, init_data);
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

#[tokio::test]
async fn health_reports_ok() {
    let app = router();
    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn status_for_an_idle_user_is_a_synthetic_stopped_snapshot() {
    let app = router();
    let (status, body) = send(&app, get("/api/timer/99/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "stopped");
    assert_eq!(body["remaining_seconds"], 0);
    assert_eq!(body["duration"], 25);
    assert_eq!(body["session_type"], "work");
}

#[tokio::test]
async fn mutations_require_a_signed_payload() {
    let app = router();
    let uri = format!("/api/timer/{USER}/start");

    let (status, body) = send(&app, post(&uri, None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "unauthorized");

    // A tampered payload is rejected the same way, with no extra detail.
    let tampered = signed_init_data(USER).replace("Ada", "Eve");
    let (status, body) = send(&app, post(&uri, Some(&tampered), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "unauthorized");
}

#[tokio::test]
async fn a_signed_payload_cannot_mutate_another_users_timer() {
    let app = router();
    let init_data = signed_init_data(USER);
    let (status, _) = send(
        &app,
        post("/api/timer/43/start", Some(&init_data), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn start_status_stop_round_trip() {
    let app = router();
    let init_data = signed_init_data(USER);
    let uri = |action: &str| format!("/api/timer/{USER}/{action}");

    let body = serde_json::json!({ "duration_minutes": 25, "session_type": "work" });
    let (status, response) = send(&app, post(&uri("start"), Some(&init_data), Some(body))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "ok");
    assert_eq!(response["timer"]["state"], "running");

    let (status, snapshot) = send(&app, get(&format!("/api/timer/{USER}/status"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["state"], "running");
    let remaining = snapshot["remaining_seconds"].as_u64().unwrap();
    assert!(remaining <= 1500 && remaining > 1490, "remaining={remaining}");

    let (status, response) = send(&app, post(&uri("stop"), Some(&init_data), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["timer"]["state"], "stopped");

    let (_, snapshot) = send(&app, get(&format!("/api/timer/{USER}/status"))).await;
    assert_eq!(snapshot["state"], "stopped");
    assert_eq!(snapshot["remaining_seconds"], 0);
}

#[tokio::test]
async fn out_of_bounds_duration_is_rejected() {
    let app = router();
    let init_data = signed_init_data(USER);
    let body = serde_json::json!({ "duration_minutes": 121 });
    let (status, response) = send(
        &app,
        post(
            &format!("/api/timer/{USER}/start"),
            Some(&init_data),
            Some(body),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["status"], "error");
}

#[tokio::test]
async fn starting_twice_conflicts() {
    let app = router();
    let init_data = signed_init_data(USER);
    let uri = format!("/api/timer/{USER}/start");

    let (status, _) = send(&app, post(&uri, Some(&init_data), None)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, response) = send(&app, post(&uri, Some(&init_data), None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(response["status"], "error");
}

#[tokio::test]
async fn pause_and_resume_flow() {
    let app = router();
    let init_data = signed_init_data(USER);
    let uri = |action: &str| format!("/api/timer/{USER}/{action}");

    // Pausing with no timer conflicts.
    let (status, _) = send(&app, post(&uri("pause"), Some(&init_data), None)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    send(&app, post(&uri("start"), Some(&init_data), None)).await;
    let (status, response) = send(&app, post(&uri("pause"), Some(&init_data), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["timer"]["state"], "paused");

    let (_, snapshot) = send(&app, get(&format!("/api/timer/{USER}/status"))).await;
    assert_eq!(snapshot["state"], "paused");

    let (status, response) = send(&app, post(&uri("resume"), Some(&init_data), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["timer"]["state"], "running");
}

#[tokio::test]
async fn stop_without_a_timer_conflicts() {
    let app = router();
    let init_data = signed_init_data(USER);
    let (status, response) = send(
        &app,
        post(&format!("/api/timer/{USER}/stop"), Some(&init_data), None),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(response["status"], "error");
}

#[tokio::test]
async fn countdown_page_is_served() {
    let app = router();
    let response = app
        .clone()
        .oneshot(get("/timer/42"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(content_type.starts_with("text/html"));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let page = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(page.contains("/api/timer/"));
}
