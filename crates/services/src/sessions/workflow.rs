use std::sync::Arc;
use tracing::{info, warn};

use quiz_core::Clock;
use quiz_core::model::{Question, QuestionView, QuizReport, Selection};
use storage::repository::{IndexQueueStore, Storage};

use super::service::{GradeResult, QuizSession};
use crate::bank::load_bank;
use crate::config::QuizConfig;
use crate::error::{LoadError, PoolServiceError, SessionError};
use crate::pool_service::PoolService;

/// Host-facing command surface: start, submit, next, finish, report.
///
/// Owns the loaded question bank and the pool; sessions are handed out by value
/// and passed back in by `&mut` for each command.
pub struct QuizLoopService {
    bank: Arc<[Question]>,
    pool: PoolService,
    config: QuizConfig,
    clock: Clock,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        bank: Vec<Question>,
        queues: Arc<dyn IndexQueueStore>,
        config: QuizConfig,
        clock: Clock,
    ) -> Self {
        let pool = PoolService::new(queues, config.queue_key.clone());
        Self {
            bank: bank.into(),
            pool,
            config,
            clock,
        }
    }

    /// Fetch the question bank from `storage` and build the service.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if the bank cannot be fetched, parsed, or is empty.
    pub async fn load(
        storage: &Storage,
        config: QuizConfig,
        clock: Clock,
    ) -> Result<Self, LoadError> {
        let bank = load_bank(storage.questions.as_ref()).await?;
        Ok(Self::new(bank, Arc::clone(&storage.queues), config, clock))
    }

    /// Use a seeded random source for pool draws.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.pool = self.pool.with_seed(seed);
        self
    }

    #[must_use]
    pub fn bank_len(&self) -> usize {
        self.bank.len()
    }

    /// Draw the next session from the pool.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Pool` if the draw or queue persistence fails.
    pub async fn start_session(&mut self) -> Result<QuizSession, SessionError> {
        let draw = self.pool.draw(&self.bank, self.config.session_size).await?;
        let session = QuizSession::new(draw.questions, draw.indices, self.clock)?;
        info!(total = session.total(), "session started");
        Ok(session)
    }

    /// Grade the user's selection for the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptySelection` (recoverable) or `SessionError::Sequence`.
    pub fn submit_answer(
        &self,
        session: &mut QuizSession,
        selection: &Selection,
    ) -> Result<GradeResult, SessionError> {
        session.submit(selection).inspect_err(|err| {
            if !err.is_recoverable() {
                warn!(error = %err, "submit rejected");
            }
        })
    }

    /// Advance and return the next question, or `None` when the session is over.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Sequence` if the current question is unanswered
    /// or the session already finished.
    pub fn next_question(
        &self,
        session: &mut QuizSession,
    ) -> Result<Option<QuestionView>, SessionError> {
        session.advance().inspect_err(|err| {
            warn!(error = %err, "advance rejected");
        })?;
        if session.is_complete() {
            info!(
                score = session.score(),
                total = session.total(),
                "session finished"
            );
        }
        Ok(session.current_view())
    }

    /// End the session immediately.
    pub fn finish_now(&self, session: &mut QuizSession) -> QuizReport {
        let report = session.finish_now();
        if report.finished_early {
            info!(
                score = report.score,
                answered = report.answered,
                total = report.total,
                "session finished early"
            );
        }
        report
    }

    /// Final report for a finished session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Sequence` while the session is still running.
    pub fn get_report(&self, session: &QuizSession) -> Result<QuizReport, SessionError> {
        session.results()
    }

    /// Questions left in the persisted pool before the next reseed.
    ///
    /// # Errors
    ///
    /// Returns `PoolServiceError::Storage` if the queue cannot be read.
    pub async fn remaining_in_pool(&self) -> Result<usize, PoolServiceError> {
        self.pool.remaining_in_pool().await
    }

    /// Clear the persisted pool so the next session reseeds.
    ///
    /// # Errors
    ///
    /// Returns `PoolServiceError::Storage` if the queue cannot be cleared.
    pub async fn reset_pool(&self) -> Result<(), PoolServiceError> {
        self.pool.reset_pool().await
    }
}

impl std::fmt::Debug for QuizLoopService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizLoopService")
            .field("bank_len", &self.bank.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
