//! selfcheck-core: Dataset loading, grading rules, and the selection engine.
//!
//! This crate defines the question model, turns tabular question text into
//! that model, and verifies learner answers against it. It performs no I/O;
//! the raw dataset text is supplied by the caller.

pub mod engine;
pub mod error;
pub mod grading;
pub mod loader;
pub mod model;

pub use engine::{CheckResult, Engine, FieldVerdict, Overall, Verdict};
pub use error::{Diagnostic, DiagnosticKind, EngineError, InputError, LoadError};
pub use grading::{FeedbackTier, GradingPolicy, ToleranceMode};
pub use loader::{
    parse_dataset, parse_dataset_with, validate_dataset, Dataset, DatasetFormat, ValidationWarning,
};
pub use model::{Question, QuestionKey, TaskEntry, TaskId};
