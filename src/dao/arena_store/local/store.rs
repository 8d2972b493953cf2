use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde::{Serialize, de::DeserializeOwned};
use tokio::{fs, sync::Mutex};
use tracing::debug;

use crate::dao::{
    arena_store::{ArenaStore, BackendKind},
    models::{ContestEntity, ContestId, EntryEntity, EntryId},
    storage::StorageResult,
};

use super::error::{LocalDaoError, LocalResult};

const ENTRIES_FILE: &str = "entries.json";
const CONTESTS_FILE: &str = "contests.json";

/// Single-machine fallback store keeping each relation as a JSON array on disk.
///
/// Every mutation is a read-modify-write of the whole relation file, serialized
/// by a per-relation gate and committed with a rename so readers never observe
/// a half-written file.
#[derive(Clone)]
pub struct LocalArenaStore {
    inner: Arc<LocalInner>,
}

struct LocalInner {
    data_dir: PathBuf,
    entries_gate: Mutex<()>,
    contests_gate: Mutex<()>,
}

impl LocalArenaStore {
    /// Open (lazily) a store rooted at `data_dir`; nothing touches the disk until first use.
    pub fn open(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(LocalInner {
                data_dir: data_dir.into(),
                entries_gate: Mutex::new(()),
                contests_gate: Mutex::new(()),
            }),
        }
    }

    /// Directory holding the relation files.
    pub fn data_dir(&self) -> &Path {
        &self.inner.data_dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.inner.data_dir.join(file)
    }

    async fn read_relation<T>(&self, file: &str) -> LocalResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let path = self.path(file);
        match fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(|byte| byte.is_ascii_whitespace()) => Ok(Vec::new()),
            Ok(bytes) => {
                serde_json::from_slice(&bytes).map_err(|source| LocalDaoError::Decode { path, source })
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(LocalDaoError::Read { path, source }),
        }
    }

    async fn write_relation<T>(&self, file: &str, rows: &[T]) -> LocalResult<()>
    where
        T: Serialize,
    {
        self.ensure_data_dir().await?;

        let path = self.path(file);
        let payload = serde_json::to_vec_pretty(rows).map_err(|source| LocalDaoError::Encode {
            path: path.clone(),
            source,
        })?;

        let staging = path.with_extension("json.tmp");
        fs::write(&staging, payload)
            .await
            .map_err(|source| LocalDaoError::Write {
                path: staging.clone(),
                source,
            })?;
        fs::rename(&staging, &path)
            .await
            .map_err(|source| LocalDaoError::Write {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), rows = rows.len(), "local relation rewritten");
        Ok(())
    }

    async fn ensure_data_dir(&self) -> LocalResult<()> {
        fs::create_dir_all(&self.inner.data_dir)
            .await
            .map_err(|source| LocalDaoError::CreateDir {
                path: self.inner.data_dir.clone(),
                source,
            })
    }

    async fn entries(&self) -> LocalResult<Vec<EntryEntity>> {
        self.read_relation(ENTRIES_FILE).await
    }

    async fn contests(&self) -> LocalResult<Vec<ContestEntity>> {
        self.read_relation(CONTESTS_FILE).await
    }

    async fn append_entry(&self, entry: EntryEntity) -> LocalResult<()> {
        let _gate = self.inner.entries_gate.lock().await;
        let mut entries = self.entries().await?;
        if entries.iter().any(|existing| existing.id == entry.id) {
            return Err(LocalDaoError::DuplicateEntry { entry_id: entry.id });
        }
        entries.push(entry);
        self.write_relation(ENTRIES_FILE, &entries).await
    }

    /// Append `contest` unless one of its entries is already referenced.
    ///
    /// The check and the append happen under the same gate, so two concurrent
    /// matchmaking runs in this process cannot both pair the same entry.
    async fn append_contest(&self, contest: ContestEntity) -> LocalResult<()> {
        if contest.entry_a_id == contest.entry_b_id {
            return Err(LocalDaoError::IdenticalEntries {
                entry_id: contest.entry_a_id,
            });
        }

        let _gate = self.inner.contests_gate.lock().await;
        let mut contests = self.contests().await?;
        for candidate in [&contest.entry_a_id, &contest.entry_b_id] {
            if contests.iter().any(|existing| existing.involves(candidate)) {
                return Err(LocalDaoError::AlreadyPaired {
                    entry_id: candidate.clone(),
                });
            }
        }
        contests.push(contest);
        self.write_relation(CONTESTS_FILE, &contests).await
    }

    async fn bump_votes(&self, id: EntryId) -> LocalResult<u32> {
        let _gate = self.inner.entries_gate.lock().await;
        let mut entries = self
            .entries()
            .await?
            .into_iter()
            .map(|entry| (entry.id.clone(), entry))
            .collect::<IndexMap<_, _>>();

        let Some(entry) = entries.get_mut(&id) else {
            return Err(LocalDaoError::EntryNotFound { entry_id: id });
        };
        entry.votes = entry.votes.saturating_add(1);
        let votes = entry.votes;

        let rows = entries.into_values().collect::<Vec<_>>();
        self.write_relation(ENTRIES_FILE, &rows).await?;
        Ok(votes)
    }
}

impl ArenaStore for LocalArenaStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn list_entries(&self) -> BoxFuture<'static, StorageResult<Vec<EntryEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.entries().await.map_err(Into::into) })
    }

    fn list_contests(&self) -> BoxFuture<'static, StorageResult<Vec<ContestEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.contests().await.map_err(Into::into) })
    }

    fn find_contest(
        &self,
        id: ContestId,
    ) -> BoxFuture<'static, StorageResult<Option<ContestEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let contests = store.contests().await?;
            Ok(contests.into_iter().find(|contest| contest.id == id))
        })
    }

    fn insert_entry(&self, entry: EntryEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.append_entry(entry).await.map_err(Into::into) })
    }

    fn insert_contest(&self, contest: ContestEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.append_contest(contest).await.map_err(Into::into) })
    }

    fn increment_votes(&self, id: EntryId) -> BoxFuture<'static, StorageResult<u32>> {
        let store = self.clone();
        Box::pin(async move { store.bump_votes(id).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_data_dir().await.map_err(Into::into) })
    }
}
