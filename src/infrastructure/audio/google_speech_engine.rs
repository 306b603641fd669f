use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

use crate::application::ports::{TranscriptionEngine, TranscriptionError};
use crate::domain::Transcript;

const DEFAULT_BASE_URL: &str = "https://speech.googleapis.com/v1";

/// Fixed recognition settings applied to every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionConfig {
    pub encoding: String,
    pub language_code: String,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            encoding: "WEBM_OPUS".to_string(),
            language_code: "es-CO".to_string(),
        }
    }
}

/// Synchronous Cloud Speech-to-Text recognition over REST.
pub struct GoogleSpeechEngine {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    config: RecognitionConfig,
}

impl GoogleSpeechEngine {
    pub fn new(api_key: String, base_url: Option<String>, config: RecognitionConfig) -> Self {
        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
            config,
        }
    }
}

#[derive(Serialize)]
struct RecognizeRequest<'a> {
    config: RecognizeConfig<'a>,
    audio: RecognitionAudio,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognizeConfig<'a> {
    encoding: &'a str,
    language_code: &'a str,
}

#[derive(Serialize)]
struct RecognitionAudio {
    content: String,
}

#[derive(Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionSegment>,
}

#[derive(Deserialize)]
struct RecognitionSegment {
    #[serde(default)]
    alternatives: Vec<RecognitionAlternative>,
}

#[derive(Deserialize)]
struct RecognitionAlternative {
    #[serde(default)]
    transcript: String,
}

#[async_trait]
impl TranscriptionEngine for GoogleSpeechEngine {
    async fn transcribe(&self, audio_data: &[u8]) -> Result<Transcript, TranscriptionError> {
        let url = format!("{}/speech:recognize", self.base_url);
        let body = RecognizeRequest {
            config: RecognizeConfig {
                encoding: &self.config.encoding,
                language_code: &self.config.language_code,
            },
            audio: RecognitionAudio {
                content: BASE64.encode(audio_data),
            },
        };

        tracing::debug!(
            encoding = %self.config.encoding,
            language = %self.config.language_code,
            bytes = audio_data.len(),
            "Sending audio to Google Speech-to-Text"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(TranscriptionError::ApiRequestFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let result: RecognizeResponse = response
            .json()
            .await
            .map_err(|e| TranscriptionError::InvalidResponse(format!("parse response: {}", e)))?;

        let segments = result.results.len();
        let transcript = Transcript::from_segments(
            result
                .results
                .into_iter()
                .filter_map(|segment| segment.alternatives.into_iter().next())
                .map(|top| top.transcript),
        );

        tracing::info!(
            segments,
            chars = transcript.as_str().len(),
            "Google Speech-to-Text transcription completed"
        );

        Ok(transcript)
    }
}
