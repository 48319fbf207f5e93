// Local persistent storage.
// A synchronous key-value store (the browser's localStorage equivalent) and the
// resume repository that owns the two persisted keys on top of it.

pub mod kv;
pub mod repository;

use thiserror::Error;

pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use repository::{KvResumeRepository, ResumeRepository};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),
}
