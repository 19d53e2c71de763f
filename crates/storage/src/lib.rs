#![forbid(unsafe_code)]

pub mod json_source;
pub mod repository;
pub mod sqlite;

pub use json_source::JsonFileSource;
pub use repository::{InMemoryRepository, IndexQueueStore, QuestionSource, Storage, StorageError};
