//! Selection and answer verification engine.
//!
//! The engine owns the question sequence and the learner's selection path
//! (week → task → variant). All mutation goes through its methods, every
//! failure is reported as an [`EngineError`] and leaves the state untouched.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::{EngineError, InputError};
use crate::grading::{FeedbackTier, GradingPolicy};
use crate::model::{Question, TaskEntry, TaskId};

/// The learner's current selection path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub week: Option<u32>,
    pub task: Option<TaskId>,
    pub bonus: bool,
    pub variant: Option<usize>,
    /// Index of the question resolved from (week, task, bonus).
    question: Option<usize>,
}

/// Where the learner is in the selection flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Empty,
    WeekChosen,
    TaskChosen,
    VariantChosen,
    Verified(Overall),
}

/// Per-field comparison outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Match,
    Mismatch,
}

/// Overall outcome of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Overall {
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldVerdict {
    /// Zero-based input position.
    pub index: usize,
    pub label: String,
    pub verdict: Verdict,
}

/// Result of checking one set of submitted answers.
///
/// Expected values are deliberately absent; only verdicts reach the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub overall: Overall,
    pub per_field: Vec<FieldVerdict>,
    pub tier: FeedbackTier,
    pub message: String,
}

impl CheckResult {
    pub fn is_correct(&self) -> bool {
        self.overall == Overall::Correct
    }
}

/// The selection and verification engine for one learner session.
#[derive(Debug, Clone)]
pub struct Engine {
    questions: Option<Vec<Question>>,
    policy: GradingPolicy,
    selection: Selection,
    result: Option<CheckResult>,
}

impl Engine {
    /// An engine still waiting for its dataset.
    pub fn new(policy: GradingPolicy) -> Self {
        Self {
            questions: None,
            policy,
            selection: Selection::default(),
            result: None,
        }
    }

    pub fn with_questions(questions: Vec<Question>, policy: GradingPolicy) -> Self {
        let mut engine = Self::new(policy);
        engine.load(questions);
        engine
    }

    /// Install a dataset, discarding any previous selection.
    pub fn load(&mut self, questions: Vec<Question>) {
        tracing::debug!("engine loaded with {} question(s)", questions.len());
        self.questions = Some(questions);
        self.selection = Selection::default();
        self.result = None;
    }

    pub fn is_ready(&self) -> bool {
        self.questions.is_some()
    }

    pub fn policy(&self) -> &GradingPolicy {
        &self.policy
    }

    pub fn questions(&self) -> &[Question] {
        self.questions.as_deref().unwrap_or_default()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn stage(&self) -> Stage {
        if let Some(result) = &self.result {
            return Stage::Verified(result.overall);
        }
        let s = &self.selection;
        match (s.week, s.question, s.variant) {
            (None, _, _) => Stage::Empty,
            (Some(_), None, _) => Stage::WeekChosen,
            (Some(_), Some(_), None) => Stage::TaskChosen,
            (Some(_), Some(_), Some(_)) => Stage::VariantChosen,
        }
    }

    fn ready(&self) -> Result<&[Question], EngineError> {
        self.questions
            .as_deref()
            .ok_or(EngineError::DatasetNotReady)
    }

    /// Weeks that contain at least one selectable question, ascending.
    pub fn list_weeks(&self) -> Vec<u32> {
        self.questions()
            .iter()
            .filter_map(|q| q.key().map(|k| k.week))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Tasks of a week ordered by task id, regular before bonus.
    pub fn list_tasks(&self, week: u32) -> Vec<TaskEntry> {
        self.questions()
            .iter()
            .filter_map(|q| q.key())
            .filter(|k| k.week == week)
            .map(|k| TaskEntry {
                task: k.task,
                is_bonus: k.is_bonus,
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// First question in load order matching the full identity.
    fn resolve(&self, week: u32, task: TaskId, is_bonus: bool) -> Option<usize> {
        self.questions().iter().position(|q| {
            q.key()
                .is_some_and(|k| k.week == week && k.task == task && k.is_bonus == is_bonus)
        })
    }

    /// Choose a week. Clears the task, variant and any previous verdict.
    pub fn select_week(&mut self, week: u32) -> Result<Vec<TaskEntry>, EngineError> {
        self.ready()?;
        self.selection = Selection {
            week: Some(week),
            ..Selection::default()
        };
        self.result = None;
        tracing::debug!("selected week {week}");
        Ok(self.list_tasks(week))
    }

    /// Choose a task within the selected week. Clears the variant.
    pub fn select_task(&mut self, task: TaskId, is_bonus: bool) -> Result<&Question, EngineError> {
        self.ready()?;
        let week = self
            .selection
            .week
            .ok_or(EngineError::SelectionOrder { missing: "week" })?;
        let index = self
            .resolve(week, task, is_bonus)
            .ok_or_else(|| EngineError::not_found(week, task, is_bonus))?;

        self.selection = Selection {
            week: Some(week),
            task: Some(task),
            bonus: is_bonus,
            variant: None,
            question: Some(index),
        };
        self.result = None;
        tracing::debug!("selected week {week} task {task} (bonus: {is_bonus})");
        Ok(&self.questions()[index])
    }

    /// Choose a variant of the selected question.
    pub fn select_variant(&mut self, index: usize) -> Result<(), EngineError> {
        self.ready()?;
        let question = self
            .selected_question()
            .ok_or(EngineError::SelectionOrder { missing: "task" })?;
        let count = question.variant_count();
        if !question.has_variants || index >= count {
            return Err(EngineError::InvalidVariant { index, count });
        }
        self.selection.variant = Some(index);
        self.result = None;
        tracing::debug!("selected variant {index}");
        Ok(())
    }

    /// The question resolved by week, task and bonus flag.
    pub fn selected_question(&self) -> Option<&Question> {
        self.selection
            .question
            .and_then(|i| self.questions().get(i))
    }

    /// The question resolved by the full selection path.
    ///
    /// A question with variants is only active once a variant is chosen.
    pub fn active_question(&self) -> Option<&Question> {
        self.selected_question()
            .filter(|q| !q.has_variants || self.selection.variant.is_some())
    }

    pub fn list_variants(&self, question: &Question) -> usize {
        question.variant_count()
    }

    pub fn prompt_text(&self, question: &Question) -> String {
        question.prompt.clone()
    }

    pub fn field_labels(&self, question: &Question) -> Vec<String> {
        question.labels()
    }

    /// The active question and its expected values, or why there are none.
    fn expected(&self) -> Result<(&Question, &[f64]), EngineError> {
        self.ready()?;
        let question = self
            .selected_question()
            .ok_or(EngineError::IncompleteSelection("no question selected"))?;
        let expected = question
            .expected_for(self.selection.variant)
            .ok_or(EngineError::IncompleteSelection("no variant selected"))?;
        Ok((question, expected))
    }

    fn grade(&self, submitted: &[f64]) -> Result<CheckResult, EngineError> {
        let (question, expected) = self.expected()?;

        if submitted.len() != question.field_count {
            return Err(InputError::WrongCount {
                expected: question.field_count,
                got: submitted.len(),
            }
            .into());
        }
        if let Some(i) = submitted.iter().position(|v| !v.is_finite()) {
            return Err(InputError::NotANumber {
                field: i + 1,
                raw: submitted[i].to_string(),
            }
            .into());
        }

        let tolerance = self.policy.tolerance_for(question);
        let labels = question.labels();
        let mut tier = FeedbackTier::Correct;

        let per_field: Vec<FieldVerdict> = submitted
            .iter()
            .zip(expected)
            .zip(labels)
            .enumerate()
            .map(|(index, ((&s, &e), label))| {
                let verdict = if self.policy.matches(s, e, tolerance) {
                    Verdict::Match
                } else {
                    if tier == FeedbackTier::Correct {
                        tier = self.policy.tier_for(s, e);
                    }
                    Verdict::Mismatch
                };
                FieldVerdict {
                    index,
                    label,
                    verdict,
                }
            })
            .collect();

        let overall = if tier == FeedbackTier::Correct {
            Overall::Correct
        } else {
            Overall::Incorrect
        };

        Ok(CheckResult {
            overall,
            per_field,
            tier,
            message: tier.message().to_string(),
        })
    }

    /// Check submitted answers against the active question.
    pub fn check_answer(&mut self, submitted: &[f64]) -> Result<CheckResult, EngineError> {
        let result = self.grade(submitted)?;
        tracing::debug!("checked answer: {:?} ({})", result.overall, result.tier);
        self.result = Some(result.clone());
        Ok(result)
    }

    /// Check answers typed as text. Blank or non-numeric inputs are rejected
    /// outright; no partial verdict is produced.
    pub fn check_raw(&mut self, inputs: &[&str]) -> Result<CheckResult, EngineError> {
        self.expected()?;
        let values = inputs
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                let raw = raw.trim();
                if raw.is_empty() {
                    return Err(InputError::Blank { field: i + 1 });
                }
                match raw.parse::<f64>() {
                    Ok(v) if v.is_finite() => Ok(v),
                    _ => Err(InputError::NotANumber {
                        field: i + 1,
                        raw: raw.to_string(),
                    }),
                }
            })
            .collect::<Result<Vec<f64>, InputError>>()?;
        self.check_answer(&values)
    }

    /// The verdict currently shown, if any.
    pub fn last_result(&self) -> Option<&CheckResult> {
        self.result.as_ref()
    }

    /// Drop the shown verdict, e.g. when the learner edits an input.
    pub fn clear_result(&mut self) {
        self.result = None;
    }
}
