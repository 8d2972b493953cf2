use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached or answered with an error.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// What was being attempted.
        message: String,
        /// Underlying backend failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The remote backend is configured but currently failing its health checks.
    #[error("remote storage is degraded")]
    Degraded,
    /// A conditional write lost against existing state (e.g. an entry is already paired).
    #[error("storage conflict: {message}")]
    Conflict {
        /// Human readable detail.
        message: String,
    },
    /// The write violates a data rule and will never succeed as submitted.
    #[error("storage rejected write: {message}")]
    Rejected {
        /// Human readable detail.
        message: String,
    },
    /// The requested record does not exist.
    #[error("not found: {message}")]
    NotFound {
        /// Human readable detail.
        message: String,
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

    /// Construct a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        StorageError::Conflict {
            message: message.into(),
        }
    }

    /// Construct a rejected-write error.
    pub fn rejected(message: impl Into<String>) -> Self {
        StorageError::Rejected {
            message: message.into(),
        }
    }

    /// Construct a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        StorageError::NotFound {
            message: message.into(),
        }
    }
}
