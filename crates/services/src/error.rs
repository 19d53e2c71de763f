//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{QuestionError, SequenceError};
use quiz_core::pool::PoolError;
use storage::repository::StorageError;

/// The question bank could not be loaded. Fatal: no session can start.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("question bank could not be read: {0}")]
    Source(#[from] StorageError),
    #[error("question {index} is invalid: {source}")]
    Invalid {
        index: usize,
        #[source]
        source: QuestionError,
    },
    #[error("question bank is empty")]
    EmptyBank,
}

/// Errors emitted by `PoolService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PoolServiceError {
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,
    /// Nothing was selected. Recoverable: re-prompt, the session is unchanged.
    #[error("select at least one answer")]
    EmptySelection,
    #[error(transparent)]
    Sequence(#[from] SequenceError),
    #[error(transparent)]
    Pool(#[from] PoolServiceError),
}

impl SessionError {
    /// True for errors the user can fix by trying again.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::EmptySelection)
    }
}
