//! Bounded, non-repeating question draws across sessions.
//!
//! The pool is a queue of indices into the question bank. Each draw takes the
//! front of the queue; the rest is handed back for persistence. A fresh
//! full-range shuffle is generated only when the queue is empty, so every
//! question is served once per cycle.

use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use thiserror::Error;

use crate::model::Question;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PoolError {
    #[error("question bank is empty")]
    EmptyBank,

    #[error("session size must be at least 1")]
    ZeroSessionSize,
}

/// Why a persisted queue could not be used as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueDefect {
    OutOfRange { index: usize, bank_len: usize },
    Duplicate { index: usize },
}

/// Result of a single pool draw.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionDraw {
    pub questions: Vec<Question>,
    /// Bank indices of `questions`, in session order.
    pub indices: Vec<usize>,
    /// Queue to persist for the next draw.
    pub remaining: Vec<usize>,
    /// True when the queue was regenerated for this draw.
    pub reseeded: bool,
    /// Set when a persisted queue was discarded.
    pub discarded: Option<QueueDefect>,
}

/// Uniformly shuffled permutation of `0..len`.
pub fn fresh_queue<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<usize> {
    let mut queue: Vec<usize> = (0..len).collect();
    queue.shuffle(rng);
    queue
}

/// Check that `queue` has no duplicates and no index outside `0..bank_len`.
///
/// # Errors
///
/// Returns the first defect found.
pub fn check_queue(queue: &[usize], bank_len: usize) -> Result<(), QueueDefect> {
    let mut seen = HashSet::with_capacity(queue.len());
    for &index in queue {
        if index >= bank_len {
            return Err(QueueDefect::OutOfRange { index, bank_len });
        }
        if !seen.insert(index) {
            return Err(QueueDefect::Duplicate { index });
        }
    }
    Ok(())
}

/// Draw the next session from `bank`.
///
/// `persisted` is the leftover queue from the previous draw. When it is absent,
/// empty, or fails `check_queue`, a fresh shuffle of the whole bank is used.
/// The session is the first `min(session_size, queue.len())` indices.
///
/// # Errors
///
/// Returns `PoolError::EmptyBank` for an empty bank and
/// `PoolError::ZeroSessionSize` when `session_size` is 0.
pub fn draw_session<R: Rng + ?Sized>(
    bank: &[Question],
    session_size: usize,
    persisted: Option<Vec<usize>>,
    rng: &mut R,
) -> Result<SessionDraw, PoolError> {
    if bank.is_empty() {
        return Err(PoolError::EmptyBank);
    }
    if session_size == 0 {
        return Err(PoolError::ZeroSessionSize);
    }

    let mut discarded = None;
    let persisted = persisted.filter(|queue| !queue.is_empty()).and_then(|queue| {
        match check_queue(&queue, bank.len()) {
            Ok(()) => Some(queue),
            Err(defect) => {
                discarded = Some(defect);
                None
            }
        }
    });

    let reseeded = persisted.is_none();
    let mut queue = persisted.unwrap_or_else(|| fresh_queue(bank.len(), rng));

    let take = session_size.min(queue.len());
    let remaining = queue.split_off(take);
    let indices = queue;
    let questions = indices.iter().map(|&i| bank[i].clone()).collect();

    Ok(SessionDraw {
        questions,
        indices,
        remaining,
        reseeded,
        discarded,
    })
}
