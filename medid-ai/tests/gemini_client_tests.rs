//! GeminiClient against a local fake of the generateContent endpoint
//!
//! The fake binds an ephemeral port, records what it received and answers
//! with a canned status and body.

mod helpers;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use medid_ai::services::{
    GeminiClient, Identification, IdentifierError, ImageIdentifier, UploadedImage,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use helpers::png_bytes;

#[derive(Clone)]
struct FakeGemini {
    status: StatusCode,
    reply: Value,
    received: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

async fn generate_content(
    State(fake): State<FakeGemini>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let api_key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    fake.received.lock().await.push((api_key, body));
    (fake.status, Json(fake.reply.clone()))
}

/// Start the fake and return a client pointed at it
async fn start_fake(status: StatusCode, reply: Value) -> (GeminiClient, FakeGemini) {
    let fake = FakeGemini {
        status,
        reply,
        received: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/v1beta/models/:model_action", post(generate_content))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = GeminiClient::new(
        "test-key".to_string(),
        "gemini-1.5-flash",
        format!("http://{}/v1beta", addr),
        Duration::from_secs(5),
    )
    .unwrap();
    (client, fake)
}

fn candidate_text(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"parts": [{"text": text}], "role": "model"},
            "finishReason": "STOP"
        }]
    })
}

fn image() -> UploadedImage {
    UploadedImage::new("box.png", png_bytes(32)).unwrap()
}

#[tokio::test]
async fn test_identified_response() {
    let (client, fake) = start_fake(
        StatusCode::OK,
        candidate_text("```json\n{\"accurate\": {\"name\": \"Cetirizine\"}}\n```"),
    )
    .await;

    match client.identify(&image()).await.unwrap() {
        Identification::Identified(result) => {
            assert_eq!(result.accurate.unwrap().name.as_deref(), Some("Cetirizine"));
        }
        other => panic!("expected identified result, got {other:?}"),
    }

    let received = fake.received.lock().await;
    assert_eq!(received.len(), 1);
    let (api_key, body) = &received[0];
    assert_eq!(api_key.as_deref(), Some("test-key"));
    assert_eq!(body["contents"][0]["parts"][1]["inline_data"]["mime_type"], "image/png");
}

#[tokio::test]
async fn test_unparsable_text_is_parse_failure() {
    let (client, _) = start_fake(StatusCode::OK, candidate_text("I think this is ibuprofen.")).await;

    let identification = client.identify(&image()).await.unwrap();
    assert!(matches!(identification, Identification::ParseFailure(_)));
}

#[tokio::test]
async fn test_blocked_prompt_is_parse_failure() {
    let (client, _) = start_fake(
        StatusCode::OK,
        json!({"promptFeedback": {"blockReason": "SAFETY"}}),
    )
    .await;

    match client.identify(&image()).await.unwrap() {
        Identification::ParseFailure(reason) => assert!(reason.contains("SAFETY")),
        other => panic!("expected parse failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_forbidden_is_invalid_api_key() {
    let (client, _) = start_fake(
        StatusCode::FORBIDDEN,
        json!({"error": {"code": 403, "status": "PERMISSION_DENIED"}}),
    )
    .await;

    let err = client.identify(&image()).await.unwrap_err();
    assert!(matches!(err, IdentifierError::InvalidApiKey));
}

#[tokio::test]
async fn test_server_error_is_api_error() {
    let (client, _) = start_fake(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"error": {"code": 500, "status": "INTERNAL"}}),
    )
    .await;

    match client.identify(&image()).await.unwrap_err() {
        IdentifierError::ApiError(status, body) => {
            assert_eq!(status, 500);
            assert!(body.contains("INTERNAL"));
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let client = GeminiClient::new(
        "test-key".to_string(),
        "gemini-1.5-flash",
        "http://127.0.0.1:9/v1beta",
        Duration::from_secs(2),
    )
    .unwrap();

    let err = client.identify(&image()).await.unwrap_err();
    assert!(matches!(err, IdentifierError::NetworkError(_)));
}
