use std::io;
use std::path::PathBuf;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::io::AsyncWriteExt;

use crate::domain::AudioUpload;

/// Stages uploaded audio as uniquely named files in a scratch directory.
pub struct TempAudioStore {
    scratch_dir: PathBuf,
}

impl TempAudioStore {
    pub fn new(scratch_dir: PathBuf) -> Result<Self, StagingError> {
        std::fs::create_dir_all(&scratch_dir).map_err(StagingError::Io)?;
        Ok(Self { scratch_dir })
    }

    pub async fn stage(
        &self,
        filename: Option<String>,
        mut stream: BoxStream<'_, Result<Bytes, io::Error>>,
    ) -> Result<AudioUpload, StagingError> {
        let (file, path) = tempfile::Builder::new()
            .prefix("audio-")
            .tempfile_in(&self.scratch_dir)
            .map_err(StagingError::Io)?
            .into_parts();
        let mut file = tokio::fs::File::from_std(file);

        // `path` deletes the file if any of the writes below bail out.
        let mut total_bytes: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(StagingError::Stream)?;
            total_bytes += bytes.len() as u64;
            file.write_all(&bytes).await.map_err(StagingError::Io)?;
        }
        file.flush().await.map_err(StagingError::Io)?;

        tracing::debug!(
            path = %path.display(),
            bytes = total_bytes,
            "Audio upload staged"
        );

        Ok(AudioUpload::new(path, filename, total_bytes))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("upload stream failed: {0}")]
    Stream(io::Error),
    #[error("io error: {0}")]
    Io(io::Error),
}
