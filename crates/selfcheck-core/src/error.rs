//! Error and diagnostic types.
//!
//! Load failures are fatal to a session. Engine errors are all recoverable:
//! the engine state is left untouched and the learner can try again.

use serde::Serialize;
use thiserror::Error;

use crate::model::{QuestionKey, TaskId};

/// The dataset could not be turned into a usable question sequence.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The raw text was empty or whitespace only.
    #[error("dataset is empty")]
    Empty,

    /// The delimiter convention itself is unusable.
    #[error("invalid dataset format: {0}")]
    Format(String),

    /// The header row could not be read.
    #[error("failed to read header row: {0}")]
    Header(String),

    /// A required column is absent from the header.
    #[error("missing required column: {0}")]
    MissingColumn(&'static str),

    /// The dataset had rows but none of them produced a question.
    #[error("no usable questions in {rows} data row(s)")]
    NoUsableRows { rows: usize },

    /// The transport could not deliver the dataset text.
    #[error("failed to fetch dataset: {0}")]
    Transport(String),
}

/// Kind of a recovered loader problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The row was skipped entirely.
    MalformedRow,
    /// The row was kept but a field fell back to a default.
    InvalidField,
}

/// A problem the loader recovered from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub line: u64,
    pub kind: DiagnosticKind,
    pub message: String,
}

/// Submitted values that cannot be graded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("expected {expected} value(s), got {got}")]
    WrongCount { expected: usize, got: usize },

    #[error("input {field} is empty")]
    Blank { field: usize },

    #[error("input {field} is not a number: {raw:?}")]
    NotANumber { field: usize, raw: String },
}

/// Errors reported by [`Engine`](crate::engine::Engine) operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// No dataset has been loaded yet.
    #[error("dataset is not loaded yet")]
    DatasetNotReady,

    /// A lower selection level was chosen before its parent.
    #[error("select a {missing} first")]
    SelectionOrder { missing: &'static str },

    /// No question matches the requested path.
    #[error("no question for {0}")]
    QuestionNotFound(QuestionKey),

    /// The variant index is out of range or the question has no variants.
    #[error("invalid variant {index} (question has {count} variant(s))")]
    InvalidVariant { index: usize, count: usize },

    /// Answers were submitted before the selection was complete.
    #[error("selection is incomplete: {0}")]
    IncompleteSelection(&'static str),

    /// The submitted values cannot be graded.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),
}

impl EngineError {
    pub(crate) fn not_found(week: u32, task: TaskId, is_bonus: bool) -> Self {
        EngineError::QuestionNotFound(QuestionKey {
            week,
            task,
            is_bonus,
        })
    }

    /// Every engine error is recoverable except a missing dataset, which
    /// only a fresh load can fix.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, EngineError::DatasetNotReady)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_readable() {
        let err = EngineError::not_found(2, TaskId::from(3), true);
        assert_eq!(err.to_string(), "no question for week 2 task 3 (bonus)");

        let err = EngineError::SelectionOrder { missing: "week" };
        assert_eq!(err.to_string(), "select a week first");

        let err: EngineError = InputError::WrongCount {
            expected: 2,
            got: 1,
        }
        .into();
        assert_eq!(err.to_string(), "invalid input: expected 2 value(s), got 1");
    }

    #[test]
    fn recoverable_classification() {
        assert!(!EngineError::DatasetNotReady.is_recoverable());
        assert!(EngineError::InvalidVariant { index: 3, count: 2 }.is_recoverable());
        assert!(EngineError::IncompleteSelection("no variant selected").is_recoverable());
    }
}
