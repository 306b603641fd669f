use std::io;

use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::{StreamExt, TryStreamExt};
use serde::Serialize;

use crate::domain::ProductQuantity;
use crate::application::sanitize_for_log;
use crate::infrastructure::storage::StagingError;
use crate::presentation::state::AppState;

pub const AUDIO_FIELD: &str = "audio";

const MISSING_AUDIO: &str = "Audio file missing";
const AUDIO_TOO_LARGE: &str = "Audio file too large";
const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Serialize)]
pub struct ProcessAudioResponse {
    pub transcription: String,
    pub products: Vec<ProductQuantity>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// Answers a broken multipart body; only an exceeded size limit is not 400.
fn multipart_failure(status: Option<StatusCode>) -> Response {
    match status {
        Some(StatusCode::PAYLOAD_TOO_LARGE) => {
            error_response(StatusCode::PAYLOAD_TOO_LARGE, AUDIO_TOO_LARGE)
        }
        _ => error_response(StatusCode::BAD_REQUEST, MISSING_AUDIO),
    }
}

fn multipart_status(error: &io::Error) -> Option<StatusCode> {
    error
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<MultipartError>())
        .map(MultipartError::status)
}

#[tracing::instrument(skip(state, multipart))]
pub async fn process_audio_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let mut multipart = match multipart {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!(error = %e, "Request is not a readable multipart form");
            return error_response(StatusCode::BAD_REQUEST, MISSING_AUDIO);
        }
    };

    let upload = loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => {
                tracing::warn!("Process request without an audio field");
                return error_response(StatusCode::BAD_REQUEST, MISSING_AUDIO);
            }
            Err(e) => {
                tracing::warn!(error = %e, status = %e.status(), "Failed to read multipart");
                return multipart_failure(Some(e.status()));
            }
        };

        if field.name() != Some(AUDIO_FIELD) {
            tracing::debug!(field = ?field.name(), "Skipping unrelated form field");
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        tracing::debug!(filename = ?filename, content_type = ?content_type, "Receiving audio upload");

        let stream = field.map_err(io::Error::other).boxed();

        match state.audio_store.stage(filename, stream).await {
            Ok(upload) => break upload,
            Err(StagingError::Stream(e)) => {
                let status = multipart_status(&e);
                tracing::warn!(error = %e, status = ?status, "Audio upload interrupted");
                return multipart_failure(status);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to stage audio upload");
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR);
            }
        }
    };

    match state.pipeline.process(upload).await {
        Ok(result) => {
            tracing::info!(
                transcription = %sanitize_for_log(&result.transcription),
                products = result.products.len(),
                "Audio processed"
            );
            (
                StatusCode::OK,
                Json(ProcessAudioResponse {
                    transcription: result.transcription,
                    products: result.products,
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Audio processing failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
        }
    }
}
