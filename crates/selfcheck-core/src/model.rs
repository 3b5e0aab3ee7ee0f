//! Core data model types for selfcheck.
//!
//! A [`Question`] is one practice problem as it came out of the dataset,
//! already normalized. Questions are immutable once the loader has built
//! them; the engine only ever hands out shared references.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Tag that marks a bonus question.
pub const BONUS_TAG: &str = "bonus";

/// Task identifier within a week: `"7"` or a dotted `"7.1"`.
///
/// Ordering is by (major, minor). A plain `"7"` is the same task as `"7.0"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId {
    pub major: u32,
    pub minor: u32,
}

impl TaskId {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl From<u32> for TaskId {
    fn from(major: u32) -> Self {
        Self { major, minor: 0 }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.minor == 0 {
            write!(f, "{}", self.major)
        } else {
            write!(f, "{}.{}", self.major, self.minor)
        }
    }
}

impl FromStr for TaskId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (major, minor) = match s.split_once('.') {
            Some((major, minor)) => (major, Some(minor)),
            None => (s, None),
        };
        let major = parse_whole(major).ok_or_else(|| format!("invalid task id: {s:?}"))?;
        let minor = match minor {
            Some(m) => m
                .trim()
                .parse::<u32>()
                .map_err(|_| format!("invalid task id: {s:?}"))?,
            None => 0,
        };
        Ok(TaskId { major, minor })
    }
}

/// Parse a non-negative whole number, accepting integral decimals like `"3.0"`.
pub(crate) fn parse_whole(s: &str) -> Option<u32> {
    let s = s.trim();
    if let Ok(n) = s.parse::<u32>() {
        return Some(n);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 {
        Some(f as u32)
    } else {
        None
    }
}

/// Identity of a targetable question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct QuestionKey {
    pub week: u32,
    pub task: TaskId,
    pub is_bonus: bool,
}

impl fmt::Display for QuestionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "week {} task {}", self.week, self.task)?;
        if self.is_bonus {
            write!(f, " (bonus)")?;
        }
        Ok(())
    }
}

/// One entry of a week's task list, as offered to the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct TaskEntry {
    pub task: TaskId,
    pub is_bonus: bool,
}

/// A single normalized practice question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    /// Week bucket; `None` when the source value was not numeric.
    pub week: Option<u32>,
    /// Task within the week; `None` when the source value was not parseable.
    pub task: Option<TaskId>,
    pub tags: BTreeSet<String>,
    /// Prompt text with line breaks as `'\n'`.
    pub prompt: String,
    /// Whether answers are split into per-variant blocks.
    pub has_variants: bool,
    /// Number of numeric inputs per variant. Always at least 1.
    pub field_count: usize,
    pub field_labels: Vec<String>,
    #[serde(skip)]
    pub answers: Vec<f64>,
    /// Per-question tolerance; `None` falls back to the engine default.
    pub tolerance: Option<f64>,
    /// Line in the source text the question was read from.
    pub line: u64,
}

impl Question {
    pub fn is_bonus(&self) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(BONUS_TAG))
    }

    /// The identity used for selection, or `None` if week or task is missing.
    pub fn key(&self) -> Option<QuestionKey> {
        Some(QuestionKey {
            week: self.week?,
            task: self.task?,
            is_bonus: self.is_bonus(),
        })
    }

    pub fn is_targetable(&self) -> bool {
        self.key().is_some()
    }

    /// Number of selectable variants; zero for questions without variants.
    pub fn variant_count(&self) -> usize {
        if self.has_variants {
            self.answers.len() / self.field_count
        } else {
            0
        }
    }

    /// Expected values for a variant.
    ///
    /// Non-variant questions ignore `variant` and return all answers.
    /// Variant questions return `None` when no variant or an out-of-range one
    /// is given.
    pub fn expected_for(&self, variant: Option<usize>) -> Option<&[f64]> {
        if !self.has_variants {
            return Some(&self.answers);
        }
        let v = variant?;
        if v >= self.variant_count() {
            return None;
        }
        let start = v * self.field_count;
        self.answers.get(start..start + self.field_count)
    }

    /// Exactly `field_count` labels for the input fields.
    pub fn labels(&self) -> Vec<String> {
        if let [single] = self.field_labels.as_slice() {
            if !single.is_empty() {
                return vec![single.clone(); self.field_count];
            }
        }
        (0..self.field_count)
            .map(|i| match self.field_labels.get(i) {
                Some(label) if !label.is_empty() => label.clone(),
                _ => format!("Input {}", i + 1),
            })
            .collect()
    }

    pub fn prompt_lines(&self) -> impl Iterator<Item = &str> {
        self.prompt.lines()
    }
}
