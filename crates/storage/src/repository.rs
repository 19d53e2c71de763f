use async_trait::async_trait;
use quiz_core::model::QuestionDraft;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(String),
}

/// Source of the full question bank, read once at startup.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch every question record, in bank order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the bank cannot be read or parsed.
    async fn fetch_questions(&self) -> Result<Vec<QuestionDraft>, StorageError>;
}

/// Key-value slot holding the leftover index queue between sessions.
///
/// No transactional guarantees are required; a store that lost its data simply
/// returns `None`, and a stored value that no longer decodes is reported as
/// `StorageError::Serialization`.
#[async_trait]
pub trait IndexQueueStore: Send + Sync {
    /// Read the queue stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored value cannot be
    /// decoded, other `StorageError`s if the backend cannot be reached.
    async fn load_queue(&self, key: &str) -> Result<Option<Vec<usize>>, StorageError>;

    /// Replace the queue stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the queue cannot be stored.
    async fn save_queue(&self, key: &str, indices: &[usize]) -> Result<(), StorageError>;

    /// Remove the queue stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be reached.
    async fn clear_queue(&self, key: &str) -> Result<(), StorageError>;
}

/// Simple in-memory implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    questions: Arc<Mutex<Vec<QuestionDraft>>>,
    queues: Arc<Mutex<HashMap<String, Vec<usize>>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_questions(questions: Vec<QuestionDraft>) -> Self {
        Self {
            questions: Arc::new(Mutex::new(questions)),
            queues: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl QuestionSource for InMemoryRepository {
    async fn fetch_questions(&self) -> Result<Vec<QuestionDraft>, StorageError> {
        let guard = self
            .questions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }
}

#[async_trait]
impl IndexQueueStore for InMemoryRepository {
    async fn load_queue(&self, key: &str) -> Result<Option<Vec<usize>>, StorageError> {
        let guard = self
            .queues
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn save_queue(&self, key: &str, indices: &[usize]) -> Result<(), StorageError> {
        let mut guard = self
            .queues
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), indices.to_vec());
        Ok(())
    }

    async fn clear_queue(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .queues
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// Aggregates the question source and queue store behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionSource>,
    pub queues: Arc<dyn IndexQueueStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory(questions: Vec<QuestionDraft>) -> Self {
        let repo = InMemoryRepository::with_questions(questions);
        let questions: Arc<dyn QuestionSource> = Arc::new(repo.clone());
        let queues: Arc<dyn IndexQueueStore> = Arc::new(repo);
        Self { questions, queues }
    }
}
