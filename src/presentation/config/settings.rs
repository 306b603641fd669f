use std::path::PathBuf;

use config::{Config, ConfigError, File};
use serde::Deserialize;

use super::Environment;
use crate::application::ports::{GenerationParams, SafetyThreshold};
use crate::infrastructure::audio::RecognitionConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub speech: SpeechSettings,
    pub catalog: CatalogSettings,
    pub llm: LlmSettings,
    pub resolution: ResolutionSettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_upload_mb: usize,
}

impl ServerSettings {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechSettings {
    pub api_key: String,
    pub base_url: String,
    pub encoding: String,
    pub language_code: String,
}

impl SpeechSettings {
    pub fn recognition_config(&self) -> RecognitionConfig {
        RecognitionConfig {
            encoding: self.encoding.clone(),
            language_code: self.language_code.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    pub products_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub thinking_budget: Option<u32>,
    pub safety_threshold: SafetyThreshold,
}

impl LlmSettings {
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            safety_threshold: self.safety_threshold,
            thinking_budget: self.thinking_budget,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolutionSettings {
    pub drop_unknown_products: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub scratch_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub json: bool,
}

impl Settings {
    /// Layers defaults, `config/<environment>.toml`, `APP__SECTION__KEY`
    /// variables and finally the bare `PORT`, `GEMINI_API_KEY` and
    /// `GOOGLE_SPEECH_API_KEY` variables.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        Self::builder(environment)?.build()?.try_deserialize()
    }

    fn builder(
        environment: Environment,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let scratch_dir = std::env::temp_dir().to_string_lossy().into_owned();

        Ok(Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.max_upload_mb", 25)?
            .set_default("speech.api_key", "")?
            .set_default("speech.base_url", "https://speech.googleapis.com/v1")?
            .set_default("speech.encoding", "WEBM_OPUS")?
            .set_default("speech.language_code", "es-CO")?
            .set_default(
                "catalog.products_url",
                "https://trista-backend.vercel.app/products",
            )?
            .set_default("llm.api_key", "")?
            .set_default(
                "llm.base_url",
                "https://generativelanguage.googleapis.com/v1beta",
            )?
            .set_default("llm.model", "gemini-flash-lite-latest")?
            .set_default("llm.temperature", 0.1)?
            .set_default("llm.max_output_tokens", 1000)?
            .set_default("llm.thinking_budget", 0)?
            .set_default("llm.safety_threshold", "BLOCK_LOW_AND_ABOVE")?
            .set_default("resolution.drop_unknown_products", false)?
            .set_default("storage.scratch_dir", scratch_dir)?
            .set_default("logging.json", false)?
            .add_source(
                File::with_name(&format!("config/{}", environment.as_str())).required(false),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .set_override_option("llm.api_key", std::env::var("GEMINI_API_KEY").ok())?
            .set_override_option(
                "speech.api_key",
                std::env::var("GOOGLE_SPEECH_API_KEY").ok(),
            )?)
    }
}
