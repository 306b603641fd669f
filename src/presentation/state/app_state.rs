use std::sync::Arc;

use crate::application::services::OrderPipeline;
use crate::infrastructure::storage::TempAudioStore;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<OrderPipeline>,
    pub audio_store: Arc<TempAudioStore>,
    pub max_upload_bytes: usize,
}
