use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use tracing::{debug, info, warn};

use quiz_core::model::Question;
use quiz_core::pool::{self, SessionDraw};
use storage::repository::{IndexQueueStore, StorageError};

use crate::error::PoolServiceError;

/// Draws sessions from the question bank and persists the leftover queue.
pub struct PoolService {
    queues: Arc<dyn IndexQueueStore>,
    queue_key: String,
    rng: StdRng,
}

impl PoolService {
    /// Create a service with an OS-seeded random source.
    #[must_use]
    pub fn new(queues: Arc<dyn IndexQueueStore>, queue_key: impl Into<String>) -> Self {
        Self {
            queues,
            queue_key: queue_key.into(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Replace the random source with a seeded one for reproducible draws.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Draw the next session and persist what is left of the queue.
    ///
    /// # Errors
    ///
    /// Returns `PoolServiceError::Pool` for an empty bank or zero session size,
    /// and `PoolServiceError::Storage` if the queue cannot be read or written.
    pub async fn draw(
        &mut self,
        bank: &[Question],
        session_size: usize,
    ) -> Result<SessionDraw, PoolServiceError> {
        let persisted = self.load_persisted().await?;
        let draw = pool::draw_session(bank, session_size, persisted, &mut self.rng)?;

        if let Some(defect) = draw.discarded {
            warn!(?defect, key = %self.queue_key, "discarding persisted queue");
        }
        if draw.reseeded {
            info!(questions = bank.len(), "starting a fresh cycle of all questions");
        }

        self.queues.save_queue(&self.queue_key, &draw.remaining).await?;

        info!(
            session = draw.questions.len(),
            remaining = draw.remaining.len(),
            "session drawn"
        );
        debug!(indices = ?draw.indices, "session indices");
        Ok(draw)
    }

    /// Number of questions left in the persisted queue before the next reseed.
    ///
    /// # Errors
    ///
    /// Returns `PoolServiceError::Storage` if the queue cannot be read.
    pub async fn remaining_in_pool(&self) -> Result<usize, PoolServiceError> {
        let queue = self.load_persisted().await?;
        Ok(queue.map_or(0, |q| q.len()))
    }

    /// Read the persisted queue. A value that no longer decodes is logged and
    /// treated as absent; the next draw overwrites it.
    async fn load_persisted(&self) -> Result<Option<Vec<usize>>, PoolServiceError> {
        match self.queues.load_queue(&self.queue_key).await {
            Ok(queue) => Ok(queue),
            Err(StorageError::Serialization(reason)) => {
                warn!(%reason, key = %self.queue_key, "discarding unreadable persisted queue");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Forget the persisted queue so the next draw starts a fresh cycle.
    ///
    /// # Errors
    ///
    /// Returns `PoolServiceError::Storage` if the queue cannot be cleared.
    pub async fn reset_pool(&self) -> Result<(), PoolServiceError> {
        self.queues.clear_queue(&self.queue_key).await?;
        info!(key = %self.queue_key, "pool reset");
        Ok(())
    }
}

impl std::fmt::Debug for PoolService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolService")
            .field("queue_key", &self.queue_key)
            .finish_non_exhaustive()
    }
}
