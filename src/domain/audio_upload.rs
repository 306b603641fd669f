use std::io;
use std::path::Path;

use tempfile::TempPath;

/// An uploaded audio clip staged on local scratch storage.
///
/// The backing file lives exactly as long as this value: `dispose` removes it
/// and reports failures, dropping it removes it silently.
#[derive(Debug)]
pub struct AudioUpload {
    path: TempPath,
    filename: Option<String>,
    size_bytes: u64,
}

impl AudioUpload {
    pub fn new(path: TempPath, filename: Option<String>, size_bytes: u64) -> Self {
        Self {
            path,
            filename,
            size_bytes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub async fn read(&self) -> io::Result<Vec<u8>> {
        tokio::fs::read(&*self.path).await
    }

    pub fn dispose(self) -> io::Result<()> {
        self.path.close()
    }
}
