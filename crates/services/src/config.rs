/// Number of questions per session when none is configured.
pub const DEFAULT_SESSION_SIZE: usize = 60;

/// Key under which the leftover index queue is stored.
pub const DEFAULT_QUEUE_KEY: &str = "quiz_pool_indices";

/// Settings shared by the pool and session services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizConfig {
    pub session_size: usize,
    pub queue_key: String,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            session_size: DEFAULT_SESSION_SIZE,
            queue_key: DEFAULT_QUEUE_KEY.to_owned(),
        }
    }
}

impl QuizConfig {
    #[must_use]
    pub fn with_session_size(mut self, session_size: usize) -> Self {
        self.session_size = session_size;
        self
    }

    #[must_use]
    pub fn with_queue_key(mut self, key: impl Into<String>) -> Self {
        self.queue_key = key.into();
        self
    }
}
