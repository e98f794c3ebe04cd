/// Health endpoint tests
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use chorus_bot::health::{router, HealthState};
use serde_json::Value;
use tower::util::ServiceExt;

async fn get(state: HealthState, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn test_health_before_ready() {
    let (status, body) = get(HealthState::new(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["bot"], "not ready");
}

#[tokio::test]
async fn test_health_reports_bot_tag() {
    let state = HealthState::new();
    state.set_ready("Chorus#1234").await;

    let (status, body) = get(state, "/health").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["bot"], "Chorus#1234");
}

#[tokio::test]
async fn test_home_banner() {
    let (status, body) = get(HealthState::new(), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("running"));
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, _) = get(HealthState::new(), "/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
