mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    CatalogSettings, LlmSettings, LoggingSettings, ResolutionSettings, ServerSettings, Settings,
    SpeechSettings, StorageSettings,
};
