use std::sync::Arc;
use std::sync::Mutex;

use bytes::Bytes;
use futures::StreamExt;
use tempfile::TempDir;

use voice_order::application::ports::{
    CatalogError, GenerationParams, GenerationRequest, LlmClient, LlmClientError, LlmTokenStream,
    ProductCatalog, TranscriptionEngine, TranscriptionError,
};
use voice_order::application::services::{IntentResolver, OrderPipeline, PipelineError};
use voice_order::domain::{AudioUpload, ProductQuantity, ProductRef, Transcript};
use voice_order::infrastructure::storage::TempAudioStore;

struct RecordingTranscriptionEngine {
    transcript: Result<&'static str, ()>,
    received: Mutex<Vec<u8>>,
}

#[async_trait::async_trait]
impl TranscriptionEngine for RecordingTranscriptionEngine {
    async fn transcribe(&self, audio_data: &[u8]) -> Result<Transcript, TranscriptionError> {
        *self.received.lock().unwrap() = audio_data.to_vec();
        self.transcript
            .map(Transcript::from)
            .map_err(|_| TranscriptionError::ApiRequestFailed("status 403".to_string()))
    }
}

struct StaticCatalog {
    products: Result<Vec<ProductRef>, ()>,
}

#[async_trait::async_trait]
impl ProductCatalog for StaticCatalog {
    async fn list_products(&self) -> Result<Vec<ProductRef>, CatalogError> {
        self.products
            .clone()
            .map_err(|_| CatalogError::InvalidResponse("expected array".to_string()))
    }
}

struct EchoTranscriptLlm;

#[async_trait::async_trait]
impl LlmClient for EchoTranscriptLlm {
    async fn complete_stream(
        &self,
        request: &GenerationRequest,
    ) -> Result<LlmTokenStream, LlmClientError> {
        let output = if request.user_text.is_empty() {
            "[]".to_string()
        } else {
            r#"[{"_id":"p1","count":2}]"#.to_string()
        };
        Ok(Box::pin(futures::stream::iter(vec![Ok(output)])))
    }
}

fn pipeline(
    engine: Arc<RecordingTranscriptionEngine>,
    products: Result<Vec<ProductRef>, ()>,
) -> OrderPipeline {
    OrderPipeline::new(
        engine,
        Arc::new(StaticCatalog { products }),
        IntentResolver::new(Arc::new(EchoTranscriptLlm), GenerationParams::default()),
    )
}

fn engine(transcript: Result<&'static str, ()>) -> Arc<RecordingTranscriptionEngine> {
    Arc::new(RecordingTranscriptionEngine {
        transcript,
        received: Mutex::new(Vec::new()),
    })
}

async fn stage(scratch: &TempDir, data: &'static [u8]) -> AudioUpload {
    let store = TempAudioStore::new(scratch.path().to_path_buf()).unwrap();
    let stream = futures::stream::iter(vec![Ok(Bytes::from_static(data))]).boxed();
    store.stage(Some("clip.webm".to_string()), stream).await.unwrap()
}

#[tokio::test]
async fn given_staged_audio_when_processing_then_transcribes_exact_bytes_and_removes_file() {
    let scratch = tempfile::tempdir().unwrap();
    let upload = stage(&scratch, b"opus-frames").await;
    let path = upload.path().to_path_buf();
    let engine = engine(Ok("dos camisas azules"));
    let pipeline = pipeline(
        Arc::clone(&engine),
        Ok(vec![ProductRef::new("p1", "Camisa Azul")]),
    );

    let response = pipeline.process(upload).await.unwrap();

    assert_eq!(response.transcription, "dos camisas azules");
    assert_eq!(response.products, vec![ProductQuantity::new("p1", 2)]);
    assert_eq!(engine.received.lock().unwrap().as_slice(), b"opus-frames");
    assert!(!path.exists());
}

#[tokio::test]
async fn given_empty_transcript_when_processing_then_returns_empty_products() {
    let scratch = tempfile::tempdir().unwrap();
    let upload = stage(&scratch, b"silence").await;
    let pipeline = pipeline(engine(Ok("")), Ok(vec![ProductRef::new("p1", "Camisa Azul")]));

    let response = pipeline.process(upload).await.unwrap();

    assert_eq!(response.transcription, "");
    assert!(response.products.is_empty());
}

#[tokio::test]
async fn given_catalog_failure_when_processing_then_fails_and_still_removes_file() {
    let scratch = tempfile::tempdir().unwrap();
    let upload = stage(&scratch, b"opus-frames").await;
    let path = upload.path().to_path_buf();
    let pipeline = pipeline(engine(Ok("dos camisas azules")), Err(()));

    let result = pipeline.process(upload).await;

    assert!(matches!(result, Err(PipelineError::Catalog(_))));
    assert!(!path.exists());
}

#[tokio::test]
async fn given_transcription_failure_when_processing_then_fails_and_still_removes_file() {
    let scratch = tempfile::tempdir().unwrap();
    let upload = stage(&scratch, b"opus-frames").await;
    let path = upload.path().to_path_buf();
    let pipeline = pipeline(engine(Err(())), Ok(Vec::new()));

    let result = pipeline.process(upload).await;

    assert!(matches!(result, Err(PipelineError::Transcription(_))));
    assert!(!path.exists());
}
