//! The dataset source trait and the one-shot load step.

use async_trait::async_trait;

use selfcheck_core::{parse_dataset_with, Dataset, DatasetFormat, LoadError};

use crate::error::SourceError;
use crate::file::FileSource;
use crate::http::HttpSource;

/// Something that can deliver the raw dataset text.
///
/// Fetching is the only asynchronous step in a session; it happens once
/// before the engine is usable and is never retried automatically.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Human-readable location (path or URL) for messages.
    fn describe(&self) -> String;

    /// Fetch the complete dataset text.
    async fn fetch(&self) -> Result<String, SourceError>;
}

/// Pick a source for a location: `http://` and `https://` URLs are fetched
/// over HTTP, anything else is read as a local file.
pub fn create_source(location: &str) -> Result<Box<dyn DatasetSource>, SourceError> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Box::new(HttpSource::new(location)?))
    } else {
        Ok(Box::new(FileSource::new(location)))
    }
}

/// Fetch and parse a dataset. Transport failures become
/// [`LoadError::Transport`].
pub async fn load_dataset(
    source: &dyn DatasetSource,
    format: &DatasetFormat,
) -> Result<Dataset, LoadError> {
    let raw = source.fetch().await.map_err(|e| {
        tracing::error!("failed to load dataset from {}: {}", source.describe(), e);
        LoadError::Transport(e.to_string())
    })?;
    parse_dataset_with(&raw, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::StaticSource;

    #[test]
    fn create_source_by_scheme() {
        let http = create_source("https://example.com/questions.tsv").unwrap();
        assert_eq!(http.describe(), "https://example.com/questions.tsv");

        let file = create_source("data/questions.tsv").unwrap();
        assert_eq!(file.describe(), "data/questions.tsv");
    }

    #[tokio::test]
    async fn load_from_static_source() {
        let source = StaticSource::new("week\ttask\tquestion\tfield-answers\n1\t1\tFind x\t10");
        let dataset = load_dataset(&source, &DatasetFormat::default())
            .await
            .unwrap();
        assert_eq!(dataset.len(), 1);
    }

    #[tokio::test]
    async fn transport_failure_is_a_load_error() {
        let source = StaticSource::failing("connection reset");
        let err = load_dataset(&source, &DatasetFormat::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Transport(ref m) if m.contains("connection reset")));
    }
}
