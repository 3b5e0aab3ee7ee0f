//! Tolerance comparison and feedback tiers.
//!
//! One [`ToleranceMode`] is chosen per deployment and applied to every field
//! of every question. The feedback tier for a wrong answer is derived from the
//! relative difference of the first mismatched field.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::Question;

/// Relative slack on the margin that keeps values exactly on the tolerance
/// edge accepted despite binary floating point representation.
const EDGE_SLACK: f64 = 1e-9;

/// Allowed rounding error of `submitted - expected`, in machine epsilons of
/// the expected value.
const SUBTRACTION_ULPS: f64 = 4.0;

/// How a tolerance value is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToleranceMode {
    /// Tolerance is a percentage of the expected value.
    #[default]
    Percent,
    /// Tolerance is an absolute difference in the answer's units.
    ///
    /// There is no exact-zero rule here: an expected 0 accepts anything
    /// within the tolerance, since nothing is divided by it.
    Absolute,
}

impl fmt::Display for ToleranceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToleranceMode::Percent => write!(f, "percent"),
            ToleranceMode::Absolute => write!(f, "absolute"),
        }
    }
}

/// Grading configuration shared by every question in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingPolicy {
    #[serde(default)]
    pub mode: ToleranceMode,
    /// Tolerance for questions that do not carry their own.
    #[serde(default = "default_tolerance")]
    pub default_tolerance: f64,
    /// Relative difference (percent) still reported as "very close".
    #[serde(default = "default_close_pct")]
    pub close_pct: f64,
    /// Relative difference (percent) below which the direction is reported.
    /// The bound is exclusive: exactly this much off gets `ReviewApproach`.
    #[serde(default = "default_directional_pct")]
    pub directional_pct: f64,
}

fn default_tolerance() -> f64 {
    0.1
}

fn default_close_pct() -> f64 {
    5.0
}

fn default_directional_pct() -> f64 {
    20.0
}

impl Default for GradingPolicy {
    fn default() -> Self {
        Self {
            mode: ToleranceMode::default(),
            default_tolerance: default_tolerance(),
            close_pct: default_close_pct(),
            directional_pct: default_directional_pct(),
        }
    }
}

impl GradingPolicy {
    /// A percent-mode policy with the given default tolerance.
    pub fn percent(default_tolerance: f64) -> Self {
        Self {
            default_tolerance,
            ..Self::default()
        }
    }

    /// An absolute-mode policy with the given default tolerance.
    pub fn absolute(default_tolerance: f64) -> Self {
        Self {
            mode: ToleranceMode::Absolute,
            default_tolerance,
            ..Self::default()
        }
    }

    pub fn tolerance_for(&self, question: &Question) -> f64 {
        question.tolerance.unwrap_or(self.default_tolerance)
    }

    pub fn matches(&self, submitted: f64, expected: f64, tolerance: f64) -> bool {
        field_matches(submitted, expected, tolerance, self.mode)
    }

    /// Feedback tier for a mismatched field.
    pub fn tier_for(&self, submitted: f64, expected: f64) -> FeedbackTier {
        match relative_percent(submitted, expected) {
            Some(pct) if pct <= self.close_pct => FeedbackTier::VeryClose,
            Some(pct) if pct < self.directional_pct => {
                if submitted > expected {
                    FeedbackTier::TooHigh
                } else {
                    FeedbackTier::TooLow
                }
            }
            _ => FeedbackTier::ReviewApproach,
        }
    }
}

/// Compare one submitted value against its expected value.
///
/// In percent mode an expected value of exactly zero requires an exact zero.
/// A difference equal to the tolerance is accepted.
pub fn field_matches(submitted: f64, expected: f64, tolerance: f64, mode: ToleranceMode) -> bool {
    let diff = (submitted - expected).abs();
    let margin = match mode {
        ToleranceMode::Percent => {
            if expected == 0.0 {
                return submitted == 0.0;
            }
            expected.abs() * tolerance / 100.0
        }
        ToleranceMode::Absolute => tolerance,
    };
    let slack = EDGE_SLACK * margin + SUBTRACTION_ULPS * f64::EPSILON * expected.abs();
    diff <= margin + slack
}

/// Relative difference in percent, or `None` when `expected` is zero.
pub fn relative_percent(submitted: f64, expected: f64) -> Option<f64> {
    if expected == 0.0 {
        None
    } else {
        Some((submitted - expected).abs() * 100.0 / expected.abs())
    }
}

/// Learner-facing feedback level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackTier {
    Correct,
    VeryClose,
    TooHigh,
    TooLow,
    ReviewApproach,
}

impl FeedbackTier {
    pub fn message(&self) -> &'static str {
        match self {
            FeedbackTier::Correct => "Correct! Your calculation is correct.",
            FeedbackTier::VeryClose => {
                "You're very close! Just a small adjustment needed in your calculations."
            }
            FeedbackTier::TooHigh => "Your answer is a bit high. Double-check your calculations.",
            FeedbackTier::TooLow => "Your answer is a bit low. Double-check your calculations.",
            FeedbackTier::ReviewApproach => {
                "That's quite different from the expected result. Consider reviewing your \
                 approach - are you using the right formula?"
            }
        }
    }
}

impl fmt::Display for FeedbackTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeedbackTier::Correct => "correct",
            FeedbackTier::VeryClose => "very close",
            FeedbackTier::TooHigh => "too high",
            FeedbackTier::TooLow => "too low",
            FeedbackTier::ReviewApproach => "review your approach",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_within_tolerance() {
        assert!(field_matches(10.05, 10.0, 1.0, ToleranceMode::Percent));
        assert!(!field_matches(10.2, 10.0, 1.0, ToleranceMode::Percent));
        assert!(field_matches(-10.05, -10.0, 1.0, ToleranceMode::Percent));
    }

    #[test]
    fn edge_is_inclusive() {
        assert!(field_matches(10.1, 10.0, 1.0, ToleranceMode::Percent));
        assert!(field_matches(9.9, 10.0, 1.0, ToleranceMode::Percent));
        assert!(field_matches(142.5, 142.35, 0.15, ToleranceMode::Absolute));
        assert!(field_matches(0.3, 0.1, 0.2, ToleranceMode::Absolute));
        assert!(!field_matches(10.1001, 10.0, 1.0, ToleranceMode::Percent));
    }

    #[test]
    fn zero_expected_requires_exact_zero() {
        assert!(field_matches(0.0, 0.0, 1.0, ToleranceMode::Percent));
        assert!(field_matches(-0.0, 0.0, 1.0, ToleranceMode::Percent));
        assert!(!field_matches(0.0001, 0.0, 1.0, ToleranceMode::Percent));
        assert_eq!(relative_percent(0.0001, 0.0), None);
    }

    #[test]
    fn absolute_mode_ignores_magnitude() {
        assert!(field_matches(1000.4, 1000.0, 0.5, ToleranceMode::Absolute));
        assert!(!field_matches(1.6, 1.0, 0.5, ToleranceMode::Absolute));
    }

    #[test]
    fn absolute_mode_has_no_zero_guard() {
        assert!(field_matches(0.0001, 0.0, 0.1, ToleranceMode::Absolute));
        assert!(!field_matches(0.0001, 0.0, 0.0, ToleranceMode::Absolute));
    }

    #[test]
    fn absolute_slack_does_not_grow_with_expected() {
        assert!(!field_matches(5_000_000.015, 5_000_000.0, 0.01, ToleranceMode::Absolute));
        assert!(field_matches(5_000_000.01, 5_000_000.0, 0.01, ToleranceMode::Absolute));
        assert!(!field_matches(1_000_000_000.5, 1e9, 0.0, ToleranceMode::Absolute));
        assert!(field_matches(1e9, 1e9, 0.0, ToleranceMode::Absolute));
        assert!(!field_matches(1_000_000_000.5, 1e9, 0.00001, ToleranceMode::Percent));
    }

    #[test]
    fn tiers_follow_relative_difference() {
        let policy = GradingPolicy::default();
        assert_eq!(policy.tier_for(10.4, 10.0), FeedbackTier::VeryClose);
        assert_eq!(policy.tier_for(10.5, 10.0), FeedbackTier::VeryClose);
        assert_eq!(policy.tier_for(11.0, 10.0), FeedbackTier::TooHigh);
        assert_eq!(policy.tier_for(9.0, 10.0), FeedbackTier::TooLow);
        assert_eq!(policy.tier_for(12.0, 10.0), FeedbackTier::ReviewApproach);
        assert_eq!(policy.tier_for(30.0, 10.0), FeedbackTier::ReviewApproach);
        assert_eq!(policy.tier_for(1.0, 0.0), FeedbackTier::ReviewApproach);
    }

    #[test]
    fn directional_bound_is_exclusive() {
        let policy = GradingPolicy::default();
        assert_eq!(policy.tier_for(120.0, 100.0), FeedbackTier::ReviewApproach);
        assert_eq!(policy.tier_for(6.0, 5.0), FeedbackTier::ReviewApproach);
        assert_eq!(policy.tier_for(8.0, 10.0), FeedbackTier::ReviewApproach);
        assert_eq!(policy.tier_for(119.0, 100.0), FeedbackTier::TooHigh);
        assert_eq!(policy.tier_for(8.5, 10.0), FeedbackTier::TooLow);
    }

    #[test]
    fn tolerance_falls_back_to_default() {
        use crate::model::{Question, TaskId};

        let mut q = Question {
            week: Some(1),
            task: Some(TaskId::from(1)),
            tags: Default::default(),
            prompt: String::new(),
            has_variants: false,
            field_count: 1,
            field_labels: vec![],
            answers: vec![1.0],
            tolerance: None,
            line: 2,
        };
        let policy = GradingPolicy::percent(2.5);
        assert_eq!(policy.tolerance_for(&q), 2.5);
        q.tolerance = Some(0.5);
        assert_eq!(policy.tolerance_for(&q), 0.5);
    }

    #[test]
    fn policy_from_toml() {
        let policy: GradingPolicy = toml::from_str(
            r#"
mode = "absolute"
default_tolerance = 0.25
"#,
        )
        .unwrap();
        assert_eq!(policy.mode, ToleranceMode::Absolute);
        assert_eq!(policy.default_tolerance, 0.25);
        assert_eq!(policy.close_pct, 5.0);
        assert_eq!(policy.directional_pct, 20.0);

        let empty: GradingPolicy = toml::from_str("").unwrap();
        assert_eq!(empty, GradingPolicy::default());
    }
}
