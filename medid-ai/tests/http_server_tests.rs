//! HTTP Server & Routing Integration Tests

mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use helpers::{test_app, StubIdentifier};

#[tokio::test]
async fn test_root_route_serves_html() {
    let app = test_app(StubIdentifier::new());

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK, "Root route should return 200 OK");

    let content_type = response.headers().get("content-type");
    assert!(
        content_type.is_some() && content_type.unwrap().to_str().unwrap().contains("text/html"),
        "Root route should serve HTML"
    );

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("Identify Medicine"));
    assert!(html.contains("/identify/"));
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app(StubIdentifier::new());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "medid-ai");
    assert_eq!(json["identifier"], "Stub");
    assert_eq!(json["build"]["version"], json["version"]);
    assert!(json["build"]["git_hash"].is_string());
    assert!(json["build"]["profile"].is_string());
    assert!(json["uptime_seconds"].is_u64());
    assert!(json.get("last_error").is_none(), "No error recorded yet");
}

#[tokio::test]
async fn test_identify_requires_post() {
    let app = test_app(StubIdentifier::new());

    let response = app
        .oneshot(Request::builder().uri("/identify/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = test_app(StubIdentifier::new());

    let response = app
        .oneshot(Request::builder().uri("/settings").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
