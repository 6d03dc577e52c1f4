//! Error model for the storage layer.

use thiserror::Error;

/// Result type used by [`crate::KeyValueStore`] implementations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Failure while reading or writing durable client storage.
///
/// Callers in the navigation core never surface these to guards; they log and
/// continue with best-effort state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backing medium could not be read or written.
    #[error("storage io failed: {0}")]
    Io(String),

    /// Stored content could not be encoded or decoded.
    #[error("storage serialization failed: {0}")]
    Serialization(String),

    /// An internal lock was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    Poisoned,
}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value.to_string())
    }
}
