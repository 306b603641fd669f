use std::io;
use std::sync::Arc;

use crate::application::ports::{
    CatalogError, ProductCatalog, TranscriptionEngine, TranscriptionError,
};
use crate::application::services::IntentResolver;
use crate::domain::{AudioUpload, ProductQuantity};

pub struct OrderPipeline {
    transcription_engine: Arc<dyn TranscriptionEngine>,
    product_catalog: Arc<dyn ProductCatalog>,
    intent_resolver: IntentResolver,
}

impl OrderPipeline {
    pub fn new(
        transcription_engine: Arc<dyn TranscriptionEngine>,
        product_catalog: Arc<dyn ProductCatalog>,
        intent_resolver: IntentResolver,
    ) -> Self {
        Self {
            transcription_engine,
            product_catalog,
            intent_resolver,
        }
    }

    /// Runs one upload through transcription, catalog lookup and resolution.
    ///
    /// Transcription and the catalog fetch run concurrently; the first of them
    /// to fail aborts the request. The staged file is removed on every path.
    pub async fn process(&self, upload: AudioUpload) -> Result<PipelineResponse, PipelineError> {
        tracing::debug!(
            filename = upload.filename().unwrap_or("<unnamed>"),
            bytes = upload.size_bytes(),
            "Processing staged audio"
        );
        let audio = upload.read().await.map_err(PipelineError::Upload)?;

        let (transcript, catalog) = tokio::try_join!(
            async {
                self.transcription_engine
                    .transcribe(&audio)
                    .await
                    .map_err(PipelineError::Transcription)
            },
            async {
                self.product_catalog
                    .list_products()
                    .await
                    .map_err(PipelineError::Catalog)
            },
        )?;

        tracing::info!(
            transcript_chars = transcript.as_str().len(),
            catalog_size = catalog.len(),
            "Transcription and catalog ready"
        );

        let products = self.intent_resolver.resolve(&transcript, &catalog).await;

        tracing::info!(resolved = products.len(), "Order resolved");

        if let Err(e) = upload.dispose() {
            tracing::warn!(error = %e, "Failed to remove staged audio");
        }

        Ok(PipelineResponse {
            transcription: transcript.into_string(),
            products,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResponse {
    pub transcription: String,
    pub products: Vec<ProductQuantity>,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("upload: {0}")]
    Upload(io::Error),
    #[error("transcription: {0}")]
    Transcription(TranscriptionError),
    #[error("catalog: {0}")]
    Catalog(CatalogError),
}
