mod progress;
mod service;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use progress::SessionProgress;
pub use service::{GradeResult, QuizSession};
pub use workflow::QuizLoopService;
