use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The stored revision moved between read and conditional write.
    #[error("concurrent write detected on key `{key}`")]
    Conflict { key: String },
    /// The stored value is not valid JSON for the expected record type.
    #[error("stored value under key `{key}` could not be decoded")]
    Corrupted {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    /// The value could not be serialized before writing.
    #[error("value for key `{key}` could not be encoded")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct a conflict error for the given key.
    pub fn conflict(key: impl Into<String>) -> Self {
        StorageError::Conflict { key: key.into() }
    }
}
