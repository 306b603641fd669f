mod google_speech_engine;

pub use google_speech_engine::{GoogleSpeechEngine, RecognitionConfig};
