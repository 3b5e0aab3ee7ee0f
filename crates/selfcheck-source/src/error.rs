//! Source error types.

use thiserror::Error;

/// Errors that can occur while fetching dataset text.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The dataset file could not be read.
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),
}
