use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use voice_order::application::services::{IntentResolver, OrderPipeline};
use voice_order::infrastructure::audio::GoogleSpeechEngine;
use voice_order::infrastructure::catalog::HttpProductCatalog;
use voice_order::infrastructure::llm::GeminiClient;
use voice_order::infrastructure::observability::{TracingConfig, init_tracing};
use voice_order::infrastructure::storage::TempAudioStore;
use voice_order::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load configuration")?;

    init_tracing(&TracingConfig::from_settings(
        environment,
        &settings.logging,
    ));

    if settings.speech.api_key.is_empty() {
        tracing::warn!("GOOGLE_SPEECH_API_KEY is not set; transcription requests will be rejected");
    }
    if settings.llm.api_key.is_empty() {
        tracing::warn!("GEMINI_API_KEY is not set; product resolution will return no products");
    }

    let transcription_engine = Arc::new(GoogleSpeechEngine::new(
        settings.speech.api_key.clone(),
        Some(settings.speech.base_url.clone()),
        settings.speech.recognition_config(),
    ));
    let product_catalog = Arc::new(HttpProductCatalog::new(
        settings.catalog.products_url.clone(),
    ));
    let llm_client = Arc::new(GeminiClient::new(
        settings.llm.api_key.clone(),
        settings.llm.model.clone(),
        Some(settings.llm.base_url.clone()),
    ));

    let intent_resolver = IntentResolver::new(llm_client, settings.llm.generation_params())
        .with_unknown_product_filter(settings.resolution.drop_unknown_products);

    let pipeline = Arc::new(OrderPipeline::new(
        transcription_engine,
        product_catalog,
        intent_resolver,
    ));

    let audio_store = Arc::new(
        TempAudioStore::new(settings.storage.scratch_dir.clone())
            .context("Failed to prepare scratch directory")?,
    );

    let state = AppState {
        pipeline,
        audio_store,
        max_upload_bytes: settings.server.max_upload_bytes(),
    };

    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid listen address")?;
    tracing::info!("Server running at http://{}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
