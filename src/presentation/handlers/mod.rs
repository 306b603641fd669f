mod health;
mod process_audio;

pub use health::health_handler;
pub use process_audio::{AUDIO_FIELD, ErrorResponse, ProcessAudioResponse, process_audio_handler};
