//! Faults raised by storage workers and legacy cache bridges.

use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend does not implement the operation.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    #[error("storage backend error: {0}")]
    Backend(String),
}
