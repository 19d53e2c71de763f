use chrono::{DateTime, Utc};
use std::fmt;

use quiz_core::Clock;
use quiz_core::model::{
    GradeOutcome, GradingState, MistakeRecord, Question, QuestionView, QuizReport, Selection,
    SequenceError,
};

use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── GRADE RESULT ──────────────────────────────────────────────────────────────
//

/// Outcome of one submission, with the score after grading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeResult {
    /// 0-based position of the graded question in the session.
    pub index: usize,
    pub outcome: GradeOutcome,
    pub score: usize,
}

impl GradeResult {
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.outcome.is_correct()
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One bounded run of questions, graded in order.
///
/// The question list is fixed at start. Each question takes exactly one
/// submission, then `advance` moves on; advancing from the last question, or
/// calling `finish_now`, ends the session.
pub struct QuizSession {
    questions: Vec<Question>,
    bank_indices: Vec<usize>,
    state: GradingState,
    clock: Clock,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Start a session over `questions`.
    ///
    /// `bank_indices` records where each question sits in the bank; pass an
    /// empty vector when that is unknown.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no questions are provided.
    pub fn new(
        questions: Vec<Question>,
        bank_indices: Vec<usize>,
        clock: Clock,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }

        Ok(Self {
            state: GradingState::new(questions.len()),
            questions,
            bank_indices,
            clock,
            started_at: clock.now(),
            finished_at: None,
        })
    }

    #[must_use]
    pub fn bank_indices(&self) -> &[usize] {
        &self.bank_indices
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.state.score()
    }

    #[must_use]
    pub fn mistakes(&self) -> &[MistakeRecord] {
        self.state.mistakes()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state.is_finished()
    }

    /// True once the current question has been graded and is waiting for `advance`.
    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.state.is_answered()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.total(),
            answered: self.state.answered(),
            remaining: self.total().saturating_sub(self.state.current()),
            is_complete: self.is_complete(),
        }
    }

    /// The question waiting for an answer, or `None` once finished.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.state.is_finished() {
            return None;
        }
        self.questions.get(self.state.current())
    }

    #[must_use]
    pub fn current_view(&self) -> Option<QuestionView> {
        self.current_question()
            .map(|q| QuestionView::new(q, self.state.current(), self.total()))
    }

    /// Grade `selection` against the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Sequence` if the session is finished or the
    /// current question was already answered, and `SessionError::EmptySelection`
    /// if nothing was selected. No state changes on error.
    pub fn submit(&mut self, selection: &Selection) -> Result<GradeResult, SessionError> {
        let index = self.state.current();
        let question = match self.questions.get(index) {
            Some(q) if !self.state.is_finished() => q,
            _ => return Err(SequenceError::Finished.into()),
        };
        if self.state.is_answered() {
            return Err(SequenceError::AlreadyAnswered { index }.into());
        }
        if selection.is_empty() {
            return Err(SessionError::EmptySelection);
        }

        let outcome = self.state.submit(question, selection)?;
        Ok(GradeResult {
            index,
            outcome,
            score: self.state.score(),
        })
    }

    /// Move past the answered current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Sequence` if the current question has not been
    /// answered or the session is already finished.
    pub fn advance(&mut self) -> Result<(), SessionError> {
        self.state.advance()?;
        if self.state.is_finished() {
            self.finished_at = Some(self.clock.now());
        }
        Ok(())
    }

    /// End the session now and report against the planned total.
    ///
    /// Calling it on a finished session just returns the existing report.
    pub fn finish_now(&mut self) -> QuizReport {
        let now = self.clock.now();
        self.state.finish();
        let finished_at = *self.finished_at.get_or_insert(now);
        QuizReport::from_state(&self.state, self.started_at, finished_at)
    }

    /// Final results. Repeated calls return the same report.
    ///
    /// # Errors
    ///
    /// Returns `SequenceError::NotFinished` while questions remain.
    pub fn results(&self) -> Result<QuizReport, SessionError> {
        let finished_at = match self.finished_at {
            Some(at) if self.state.is_finished() => at,
            _ => return Err(SequenceError::NotFinished.into()),
        };
        Ok(QuizReport::from_state(
            &self.state,
            self.started_at,
            finished_at,
        ))
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("questions_len", &self.questions.len())
            .field("state", &self.state)
            .field("started_at", &self.started_at)
            .field("finished_at", &self.finished_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::model::QuestionDraft;
    use quiz_core::time::{fixed_clock, fixed_now};

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

    fn session(questions: Vec<Question>) -> QuizSession {
        QuizSession::new(questions, Vec::new(), fixed_clock()).unwrap()
    }

    #[test]
    fn empty_session_returns_error() {
        let err = QuizSession::new(Vec::new(), Vec::new(), fixed_clock()).unwrap_err();
        assert!(matches!(err, SessionError::Empty));
    }

    #[test]
    fn session_grades_advances_and_completes() {
        let mut s = session(vec![single(), multi()]);
        assert_eq!(s.current_view().unwrap().number, 1);

        let first = s.submit(&Selection::new(["B"])).unwrap();
        assert!(first.is_correct());
        assert_eq!(first.score, 1);
        s.advance().unwrap();

        let second = s.submit(&Selection::new(["A"])).unwrap();
        assert_eq!(
            second.outcome,
            GradeOutcome::Incorrect {
                correct: vec!["A".into(), "C".into()]
            }
        );
        assert!(!s.is_complete());
        s.advance().unwrap();

        assert!(s.is_complete());
        assert!(s.current_question().is_none());
        let report = s.results().unwrap();
        assert_eq!(report.score, 1);
        assert_eq!(report.total, 2);
        assert_eq!(report.mistakes[0].question, "Pick A and C");
        assert_eq!(report.mistakes[0].user_answer, "A");
        assert!(!report.finished_early);
    }

    #[test]
    fn empty_selection_changes_nothing() {
        let mut s = session(vec![single()]);
        let err = s.submit(&Selection::default()).unwrap_err();
        assert!(matches!(err, SessionError::EmptySelection));
        assert!(err.is_recoverable());
        assert!(!s.is_answered());
        assert_eq!(s.progress().answered, 0);

        assert!(s.submit(&Selection::new(["B"])).unwrap().is_correct());
    }

    #[test]
    fn answered_question_is_locked() {
        let mut s = session(vec![single(), single()]);
        s.submit(&Selection::new(["A"])).unwrap();
        let err = s.submit(&Selection::new(["B"])).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Sequence(SequenceError::AlreadyAnswered { index: 0 })
        ));
        assert_eq!(s.score(), 0);
        assert_eq!(s.mistakes().len(), 1);
    }

    #[test]
    fn advance_before_submit_is_a_sequence_error() {
        let mut s = session(vec![single()]);
        let err = s.advance().unwrap_err();
        assert!(matches!(
            err,
            SessionError::Sequence(SequenceError::NotAnswered)
        ));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn advance_past_end_is_a_sequence_error() {
        let mut s = session(vec![single()]);
        s.submit(&Selection::new(["B"])).unwrap();
        s.advance().unwrap();
        assert!(matches!(
            s.advance().unwrap_err(),
            SessionError::Sequence(SequenceError::Finished)
        ));
        assert!(matches!(
            s.submit(&Selection::new(["B"])).unwrap_err(),
            SessionError::Sequence(SequenceError::Finished)
        ));
    }

    #[test]
    fn results_before_finish_is_rejected() {
        let s = session(vec![single()]);
        assert!(matches!(
            s.results().unwrap_err(),
            SessionError::Sequence(SequenceError::NotFinished)
        ));
    }

    #[test]
    fn results_are_idempotent() {
        let mut s = session(vec![single()]);
        s.submit(&Selection::new(["C"])).unwrap();
        s.advance().unwrap();
        assert_eq!(s.results().unwrap(), s.results().unwrap());
    }

    #[test]
    fn finish_now_reports_against_planned_total() {
        let mut clock = fixed_clock();
        let mut s = QuizSession::new(vec![single(), single(), single()], Vec::new(), clock)
            .unwrap();
        s.submit(&Selection::new(["B"])).unwrap();
        s.advance().unwrap();

        clock.advance(Duration::minutes(3));
        s.clock = clock;
        let report = s.finish_now();
        assert_eq!(report.score, 1);
        assert_eq!(report.total, 3);
        assert_eq!(report.unanswered, 2);
        assert!(report.finished_early);
        assert_eq!(report.finished_at, fixed_now() + Duration::minutes(3));

        assert!(s.is_complete());
        assert_eq!(s.results().unwrap(), report);
        assert_eq!(s.finish_now(), report);
    }

    #[test]
    fn progress_counts_pending_questions() {
        let mut s = session(vec![single(), single(), single()]);
        assert_eq!(s.progress().remaining, 3);
        s.submit(&Selection::new(["B"])).unwrap();
        assert_eq!(s.progress().remaining, 3);
        assert_eq!(s.progress().answered, 1);
        s.advance().unwrap();
        assert_eq!(s.progress().remaining, 2);
    }
}
