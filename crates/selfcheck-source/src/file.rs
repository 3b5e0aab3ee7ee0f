//! Local file dataset source.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::instrument;

use crate::error::SourceError;
use crate::source::DatasetSource;

/// Reads the dataset from a file on disk.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DatasetSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch(&self) -> Result<String, SourceError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SourceError::Io {
                path: self.describe(),
                message: e.to_string(),
            })?;
        tracing::debug!("read {} byte(s)", text.len());
        Ok(text)
    }
}
