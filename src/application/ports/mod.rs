mod llm_client;
mod product_catalog;
mod transcription_engine;

pub use llm_client::{
    GenerationParams, GenerationRequest, LlmClient, LlmClientError, LlmTokenStream,
    SafetyThreshold,
};
pub use product_catalog::{CatalogError, ProductCatalog};
pub use transcription_engine::{TranscriptionEngine, TranscriptionError};
