use chrono::{DateTime, Utc};

use crate::model::grading::{GradingState, MistakeRecord};

/// Final results of a session.
///
/// `total` is always the planned session length, also when the session was
/// finished early; unanswered questions count neither as correct nor as mistakes.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizReport {
    pub score: usize,
    pub total: usize,
    pub answered: usize,
    pub unanswered: usize,
    pub mistakes: Vec<MistakeRecord>,
    pub finished_early: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl QuizReport {
    #[must_use]
    pub fn from_state(
        state: &GradingState,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let answered = state.answered();
        let unanswered = state.total().saturating_sub(answered);
        Self {
            score: state.score(),
            total: state.total(),
            answered,
            unanswered,
            mistakes: state.mistakes().to_vec(),
            finished_early: unanswered > 0,
            started_at,
            finished_at,
        }
    }

    /// Score as a share of the planned total, 0.0..=100.0.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.score as f64 / self.total as f64 * 100.0
    }

    /// Percentage rounded to a whole number for display.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn rounded_percentage(&self) -> u32 {
        self.percentage().round() as u32
    }

    #[must_use]
    pub fn is_perfect(&self) -> bool {
        self.total > 0 && self.score == self.total
    }
}
