#![forbid(unsafe_code)]

pub mod bank;
pub mod config;
pub mod error;
pub mod pool_service;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use bank::load_bank;
pub use config::QuizConfig;
pub use error::{LoadError, PoolServiceError, SessionError};
pub use pool_service::PoolService;

pub use sessions::{GradeResult, QuizLoopService, QuizSession, SessionProgress};
