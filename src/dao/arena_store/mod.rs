/// In-memory store with failure injection, for tests.
#[cfg(test)]
pub mod fake;
/// JSON-file store used when no remote backend is configured or it is failing.
pub mod local;
/// REST client for the remote durable backend.
#[cfg(feature = "remote-store")]
pub mod remote;
mod selector;

pub use selector::ArenaStorage;

use std::fmt;

use futures::future::BoxFuture;

use crate::dao::models::{ContestEntity, ContestId, EntryEntity, EntryId};
use crate::dao::storage::StorageResult;

/// Which family of backend serves a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Remote durable backend.
    Remote,
    /// Local file-backed fallback.
    Local,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Remote => f.write_str("remote"),
            BackendKind::Local => f.write_str("local"),
        }
    }
}

/// Abstraction over the persistence layer for entries and contests.
///
/// Implementations must make [`ArenaStore::insert_contest`] conditional: the
/// insert is refused with [`StorageError::Conflict`](crate::dao::storage::StorageError::Conflict)
/// when either entry is already referenced by a stored contest.
pub trait ArenaStore: Send + Sync {
    /// Family of this backend, for logs and health reports.
    fn kind(&self) -> BackendKind;
    /// Every stored entry, in no particular order.
    fn list_entries(&self) -> BoxFuture<'static, StorageResult<Vec<EntryEntity>>>;
    /// Every stored contest.
    fn list_contests(&self) -> BoxFuture<'static, StorageResult<Vec<ContestEntity>>>;
    /// Contest with the given id, if any.
    fn find_contest(
        &self,
        id: ContestId,
    ) -> BoxFuture<'static, StorageResult<Option<ContestEntity>>>;
    /// Store a new entry; refused when the id already exists.
    fn insert_entry(&self, entry: EntryEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Store a new contest unless either entry is already paired.
    fn insert_contest(&self, contest: ContestEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Add one vote to `id` and return the new total.
    fn increment_votes(&self, id: EntryId) -> BoxFuture<'static, StorageResult<u32>>;
    /// Cheap round trip proving the backend answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
