use std::sync::{Arc, Mutex};

use axum::Router;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use voice_order::application::ports::{TranscriptionEngine, TranscriptionError};
use voice_order::infrastructure::audio::{GoogleSpeechEngine, RecognitionConfig};

use crate::support::start_mock_server;

#[derive(Default)]
struct Captured {
    api_key: Option<String>,
    body: Option<serde_json::Value>,
}

async fn start_mock_speech_server(
    response_status: u16,
    response_body: &'static str,
) -> (String, tokio::sync::oneshot::Sender<()>, Arc<Mutex<Captured>>) {
    let captured = Arc::new(Mutex::new(Captured::default()));
    let sink = Arc::clone(&captured);

    let app = Router::new().route(
        "/speech:recognize",
        post(move |headers: HeaderMap, body: String| {
            let sink = Arc::clone(&sink);
            async move {
                let mut captured = sink.lock().unwrap();
                captured.api_key = headers
                    .get("x-goog-api-key")
                    .and_then(|v| v.to_str().ok())
                    .map(String::from);
                captured.body = serde_json::from_str(&body).ok();
                let status = StatusCode::from_u16(response_status).unwrap();
                (
                    status,
                    [(axum::http::header::CONTENT_TYPE, "application/json")],
                    response_body,
                )
                    .into_response()
            }
        }),
    );

    let (base_url, shutdown_tx) = start_mock_server(app).await;
    (base_url, shutdown_tx, captured)
}

fn engine(base_url: String) -> GoogleSpeechEngine {
    GoogleSpeechEngine::new(
        "speech-key".to_string(),
        Some(base_url),
        RecognitionConfig::default(),
    )
}

#[tokio::test]
async fn given_multiple_segments_when_transcribing_then_joins_top_alternatives() {
    let response_body = r#"{"results": [
        {"alternatives": [{"transcript": "dos camisas", "confidence": 0.9},
                          {"transcript": "dos camisetas", "confidence": 0.4}]},
        {"alternatives": [{"transcript": "azules", "confidence": 0.8}]}
    ]}"#;
    let (base_url, shutdown_tx, _) = start_mock_speech_server(200, response_body).await;

    let result = engine(base_url).transcribe(b"fake opus").await;

    assert_eq!(result.unwrap().as_str(), "dos camisas azules");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_audio_when_transcribing_then_sends_base64_content_and_fixed_config() {
    let (base_url, shutdown_tx, captured) = start_mock_speech_server(200, "{}").await;

    engine(base_url).transcribe(b"fake opus").await.unwrap();

    let captured = captured.lock().unwrap();
    assert_eq!(captured.api_key.as_deref(), Some("speech-key"));
    let body = captured.body.as_ref().unwrap();
    assert_eq!(body["config"]["encoding"], "WEBM_OPUS");
    assert_eq!(body["config"]["languageCode"], "es-CO");
    assert_eq!(body["audio"]["content"], BASE64.encode(b"fake opus"));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_no_results_when_transcribing_then_returns_empty_transcript() {
    let (base_url, shutdown_tx, _) = start_mock_speech_server(200, "{}").await;

    let result = engine(base_url).transcribe(b"silence").await;

    assert!(result.unwrap().is_empty());
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_segment_without_alternatives_when_transcribing_then_skips_it() {
    let response_body = r#"{"results": [
        {"alternatives": []},
        {"alternatives": [{"transcript": "un pantalón"}]}
    ]}"#;
    let (base_url, shutdown_tx, _) = start_mock_speech_server(200, response_body).await;

    let result = engine(base_url).transcribe(b"audio").await;

    assert_eq!(result.unwrap().as_str(), "un pantalón");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_provider_rejects_credentials_when_transcribing_then_returns_api_error() {
    let response_body = r#"{"error": {"code": 403, "message": "API key not valid"}}"#;
    let (base_url, shutdown_tx, _) = start_mock_speech_server(403, response_body).await;

    let result = engine(base_url).transcribe(b"audio").await;

    assert!(matches!(result, Err(TranscriptionError::ApiRequestFailed(_))));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_malformed_body_when_transcribing_then_returns_invalid_response() {
    let (base_url, shutdown_tx, _) = start_mock_speech_server(200, "not json").await;

    let result = engine(base_url).transcribe(b"audio").await;

    assert!(matches!(result, Err(TranscriptionError::InvalidResponse(_))));
    shutdown_tx.send(()).ok();
}
