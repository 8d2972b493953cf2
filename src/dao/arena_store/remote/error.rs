//! Error types shared by the remote storage implementation.

use reqwest::StatusCode;
use thiserror::Error;

use crate::dao::{models::EntryId, storage::StorageError};

/// Convenient result alias returning [`RemoteDaoError`] failures.
pub type RemoteResult<T> = Result<T, RemoteDaoError>;

/// Failures that can occur while talking to the remote REST endpoint.
#[derive(Debug, Error)]
pub enum RemoteDaoError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build remote HTTP client")]
    ClientBuilder {
        /// Underlying client failure.
        #[source]
        source: reqwest::Error,
    },
    /// A request could not be sent or timed out.
    #[error("failed to send remote request to `{path}`")]
    RequestSend {
        /// Request path.
        path: String,
        /// Underlying transport failure.
        #[source]
        source: reqwest::Error,
    },
    /// The endpoint returned an unexpected status code.
    #[error("unexpected remote response status {status} for `{path}`")]
    RequestStatus {
        /// Request path.
        path: String,
        /// Status returned by the endpoint.
        status: StatusCode,
    },
    /// Response payload could not be decoded into the expected rows.
    #[error("failed to decode remote response for `{path}`")]
    DecodeResponse {
        /// Request path.
        path: String,
        /// Underlying decode failure.
        #[source]
        source: reqwest::Error,
    },
    /// A uniqueness rule rejected the write (409).
    #[error("remote write to `{path}` conflicts with existing rows")]
    Conflict {
        /// Request path.
        path: String,
    },
    /// One of the entries is already referenced by a stored contest.
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
    /// No entry with this id is stored.
    #[error("entry `{entry_id}` not found")]
    EntryNotFound {
        /// Offending entry.
        entry_id: EntryId,
    },
}

impl From<RemoteDaoError> for StorageError {
    fn from(err: RemoteDaoError) -> Self {
        match err {
            RemoteDaoError::Conflict { .. } | RemoteDaoError::AlreadyPaired { .. } => {
                StorageError::conflict(err.to_string())
            }
            RemoteDaoError::IdenticalEntries { .. } => StorageError::rejected(err.to_string()),
            RemoteDaoError::EntryNotFound { .. } => StorageError::not_found(err.to_string()),
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
