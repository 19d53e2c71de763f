use thiserror::Error;

use crate::model::question::Question;
use crate::model::selection::Selection;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Protocol misuse by the host. These indicate a host bug, not bad user input.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SequenceError {
    #[error("current question has not been answered yet")]
    NotAnswered,

    #[error("question {index} was already answered")]
    AlreadyAnswered { index: usize },

    #[error("session is already finished")]
    Finished,

    #[error("session is not finished yet")]
    NotFinished,
}

//
// ─── RECORDS ──────────────────────────────────────────────────────────────────
//

/// A logged incorrect answer, kept for the end-of-session review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MistakeRecord {
    pub question: String,
    pub correct_answer: String,
    pub user_answer: String,
}

/// Outcome of grading one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GradeOutcome {
    Correct,
    Incorrect { correct: Vec<String> },
}

impl GradeOutcome {
    #[must_use]
    pub fn is_correct(&self) -> bool {
        matches!(self, Self::Correct)
    }
}

/// Grade a selection against a question without touching any state.
#[must_use]
pub fn grade(question: &Question, selection: &Selection) -> GradeOutcome {
    if selection.matches(question) {
        GradeOutcome::Correct
    } else {
        GradeOutcome::Incorrect {
            correct: question.answer().to_vec(),
        }
    }
}

//
// ─── STATE ────────────────────────────────────────────────────────────────────
//

/// Position, score and mistake log for one session of `total` questions.
///
/// The index only moves forward. A question accepts one submission, after which
/// `advance` must be called; advancing from the last question finishes the
/// session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradingState {
    total: usize,
    current: usize,
    score: usize,
    mistakes: Vec<MistakeRecord>,
    answered_current: bool,
    finished: bool,
}

impl GradingState {
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            total,
            current: 0,
            score: 0,
            mistakes: Vec::new(),
            answered_current: false,
            finished: total == 0,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub fn mistakes(&self) -> &[MistakeRecord] {
        &self.mistakes
    }

    /// Number of questions that received a submission.
    #[must_use]
    pub fn answered(&self) -> usize {
        self.score + self.mistakes.len()
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.answered_current
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Grade `selection` for `question`, which must be the question at the current index.
    ///
    /// An empty selection is graded as incorrect here; rejecting it is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns `SequenceError::Finished` after the session ended and
    /// `SequenceError::AlreadyAnswered` on a second submission for the same index.
    pub fn submit(
        &mut self,
        question: &Question,
        selection: &Selection,
    ) -> Result<GradeOutcome, SequenceError> {
        if self.finished {
            return Err(SequenceError::Finished);
        }
        if self.answered_current {
            return Err(SequenceError::AlreadyAnswered {
                index: self.current,
            });
        }

        let outcome = grade(question, selection);
        match &outcome {
            GradeOutcome::Correct => self.score += 1,
            GradeOutcome::Incorrect { .. } => self.mistakes.push(MistakeRecord {
                question: question.text().to_owned(),
                correct_answer: question.answer_joined(),
                user_answer: selection.joined_for(question),
            }),
        }
        self.answered_current = true;
        Ok(outcome)
    }

    /// Move to the next question.
    ///
    /// # Errors
    ///
    /// Returns `SequenceError::Finished` once finished and
    /// `SequenceError::NotAnswered` if the current question has no submission.
    pub fn advance(&mut self) -> Result<(), SequenceError> {
        if self.finished {
            return Err(SequenceError::Finished);
        }
        if !self.answered_current {
            return Err(SequenceError::NotAnswered);
        }
        self.current += 1;
        self.answered_current = false;
        if self.current >= self.total {
            self.finished = true;
        }
        Ok(())
    }

    /// End the session where it stands. Returns `true` if this call ended it.
    pub fn finish(&mut self) -> bool {
        let was_running = !self.finished;
        self.finished = true;
        was_running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::QuestionDraft;

    fn single() -> Question {
        QuestionDraft::new("Pick B", ["A", "B", "C"], ["B"])
            .validate()
            .unwrap()
    }

    fn multi() -> Question {
        QuestionDraft::new("Pick A and C", ["A", "B", "C"], ["A", "C"])
            .validate()
            .unwrap()
    }

    #[test]
    fn correct_single_select_scores() {
        let mut state = GradingState::new(1);
        let outcome = state.submit(&single(), &Selection::new(["B"])).unwrap();
        assert!(outcome.is_correct());
        assert_eq!(state.score(), 1);
        assert!(state.mistakes().is_empty());
    }

    #[test]
    fn incorrect_single_select_logs_mistake() {
        let mut state = GradingState::new(1);
        let outcome = state.submit(&single(), &Selection::new(["A"])).unwrap();
        assert_eq!(
            outcome,
            GradeOutcome::Incorrect {
                correct: vec!["B".to_string()]
            }
        );
        assert_eq!(state.score(), 0);
        assert_eq!(
            state.mistakes(),
            [MistakeRecord {
                question: "Pick B".into(),
                correct_answer: "B".into(),
                user_answer: "A".into(),
            }]
        );
    }

    #[test]
    fn multi_select_reverse_order_is_correct() {
        let mut state = GradingState::new(1);
        let outcome = state.submit(&multi(), &Selection::new(["C", "A"])).unwrap();
        assert!(outcome.is_correct());
    }

    #[test]
    fn partial_multi_select_is_one_mistake() {
        let mut state = GradingState::new(1);
        state.submit(&multi(), &Selection::new(["A"])).unwrap();
        assert_eq!(state.score(), 0);
        assert_eq!(state.mistakes().len(), 1);
        assert_eq!(state.mistakes()[0].correct_answer, "A, C");
    }

    #[test]
    fn second_submit_is_rejected_without_change() {
        let mut state = GradingState::new(2);
        state.submit(&single(), &Selection::new(["B"])).unwrap();
        let before = state.clone();
        let err = state.submit(&single(), &Selection::new(["A"])).unwrap_err();
        assert_eq!(err, SequenceError::AlreadyAnswered { index: 0 });
        assert_eq!(state, before);
    }

    #[test]
    fn advance_requires_submission() {
        let mut state = GradingState::new(2);
        assert_eq!(state.advance(), Err(SequenceError::NotAnswered));
        assert_eq!(state.current(), 0);
    }

    #[test]
    fn advancing_past_last_question_finishes() {
        let mut state = GradingState::new(1);
        state.submit(&single(), &Selection::new(["B"])).unwrap();
        state.advance().unwrap();
        assert!(state.is_finished());
        assert_eq!(state.current(), 1);
        assert_eq!(state.advance(), Err(SequenceError::Finished));
        assert_eq!(
            state.submit(&single(), &Selection::new(["B"])),
            Err(SequenceError::Finished)
        );
    }

    #[test]
    fn finish_is_reported_once() {
        let mut state = GradingState::new(3);
        assert!(state.finish());
        assert!(!state.finish());
        assert!(state.is_finished());
        assert_eq!(state.answered(), 0);
    }
}
