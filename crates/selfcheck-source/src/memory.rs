//! In-memory dataset source for tests and embedding.

use async_trait::async_trait;

use crate::error::SourceError;
use crate::source::DatasetSource;

/// Serves a fixed text, or a fixed failure.
pub struct StaticSource {
    text: Result<String, String>,
}

impl StaticSource {
    pub fn new(text: &str) -> Self {
        Self {
            text: Ok(text.to_string()),
        }
    }

    /// A source whose every fetch fails with a network error.
    pub fn failing(message: &str) -> Self {
        Self {
            text: Err(message.to_string()),
        }
    }
}

#[async_trait]
impl DatasetSource for StaticSource {
    fn describe(&self) -> String {
        "<memory>".to_string()
    }

    async fn fetch(&self) -> Result<String, SourceError> {
        self.text.clone().map_err(SourceError::Network)
    }
}
