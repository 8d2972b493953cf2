//! Error types shared by the local fallback storage implementation.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::dao::{models::EntryId, storage::StorageError};

/// Convenient result alias returning [`LocalDaoError`] failures.
pub type LocalResult<T> = Result<T, LocalDaoError>;

/// Failures that can occur while reading or rewriting the local relation files.
#[derive(Debug, Error)]
pub enum LocalDaoError {
    /// The data directory could not be created.
    #[error("failed to create data directory `{path}`")]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// A relation file exists but could not be read.
    #[error("failed to read `{path}`")]
    Read {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// A relation file could not be written or swapped into place.
    #[error("failed to write `{path}`")]
    Write {
        /// File that could not be written.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// A relation file does not hold the expected JSON array.
    #[error("failed to decode `{path}`")]
    Decode {
        /// File holding the malformed document.
        path: PathBuf,
        /// Underlying decode failure.
        #[source]
        source: serde_json::Error,
    },
    /// A relation could not be serialized before writing.
    #[error("failed to encode `{path}`")]
    Encode {
        /// File that was about to be written.
        path: PathBuf,
        /// Underlying encode failure.
        #[source]
        source: serde_json::Error,
    },
    /// The entry already takes part in a stored contest.
    #[error("entry `{entry_id}` is already paired")]
    AlreadyPaired {
        /// Offending entry.
        entry_id: EntryId,
    },
    /// Both sides of a contest are the same entry.
    #[error("a contest needs two distinct entries, got `{entry_id}` twice")]
    IdenticalEntries {
        /// Offending entry.
        entry_id: EntryId,
    },
    /// An entry with this id is already stored.
    #[error("entry `{entry_id}` already exists")]
    DuplicateEntry {
        /// Offending entry.
        entry_id: EntryId,
    },
    /// No entry with this id is stored.
    #[error("entry `{entry_id}` not found")]
    EntryNotFound {
        /// Offending entry.
        entry_id: EntryId,
    },
}

impl From<LocalDaoError> for StorageError {
    fn from(err: LocalDaoError) -> Self {
        match err {
            LocalDaoError::AlreadyPaired { .. } | LocalDaoError::DuplicateEntry { .. } => {
                StorageError::conflict(err.to_string())
            }
            LocalDaoError::IdenticalEntries { .. } => StorageError::rejected(err.to_string()),
            LocalDaoError::EntryNotFound { .. } => StorageError::not_found(err.to_string()),
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
