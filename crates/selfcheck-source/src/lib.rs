//! selfcheck-source: Where dataset text comes from.
//!
//! Implements the `DatasetSource` trait for local files, HTTP endpoints and
//! in-memory text, and loads the `selfcheck.toml` configuration.

pub mod config;
pub mod error;
pub mod file;
pub mod http;
pub mod memory;
pub mod source;

pub use config::{load_config, load_config_from, DatasetConfig, SelfcheckConfig};
pub use error::SourceError;
pub use file::FileSource;
pub use http::HttpSource;
pub use memory::StaticSource;
pub use source::{create_source, load_dataset, DatasetSource};
