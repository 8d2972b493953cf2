use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

use futures::future::BoxFuture;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    config::{AppConfig, RemoteConfig},
    dao::{
        arena_store::{ArenaStore, BackendKind, local::LocalArenaStore},
        models::{ContestEntity, ContestId, EntryEntity, EntryId},
        storage::{StorageError, StorageResult},
    },
};

/// Facade routing every persistence call to the backend selected at start-up.
///
/// Reads never fail: a failing remote read is served from the local store, and
/// a failing local read yields an empty result. Writes go to the active backend
/// only.
pub struct ArenaStorage {
    remote: Option<Arc<dyn ArenaStore>>,
    fallback: Arc<dyn ArenaStore>,
    contest_duration: Duration,
    degraded: watch::Sender<bool>,
}

impl ArenaStorage {
    /// Wrap explicit backends; used by `select` and by tests.
    pub fn new(
        remote: Option<Arc<dyn ArenaStore>>,
        fallback: Arc<dyn ArenaStore>,
        contest_duration: Duration,
    ) -> Self {
        let (degraded, _rx) = watch::channel(false);
        Self {
            remote,
            fallback,
            contest_duration,
            degraded,
        }
    }

    /// Pick the backend once from `config`: remote when its parameters are
    /// well formed, the local store under `data_dir` otherwise.
    pub fn select(config: &AppConfig) -> Self {
        let fallback: Arc<dyn ArenaStore> = Arc::new(LocalArenaStore::open(config.data_dir()));
        let remote = match config.remote() {
            Ok(params) => connect_remote(params),
            Err(reason) => {
                info!(
                    reason = %reason,
                    data_dir = %config.data_dir().display(),
                    "remote storage not configured; using local store"
                );
                None
            }
        };
        Self::new(remote, fallback, config.contest_duration())
    }

    /// Whether a remote backend was configured at startup.
    pub fn is_remote_configured(&self) -> bool {
        self.remote.is_some()
    }

    /// Backend that currently receives writes and first-choice reads.
    pub fn active_backend(&self) -> BackendKind {
        if self.live_remote().is_some() {
            BackendKind::Remote
        } else {
            BackendKind::Local
        }
    }

    /// Remote backend handle, used by the storage supervisor.
    pub fn remote(&self) -> Option<Arc<dyn ArenaStore>> {
        self.remote.clone()
    }

    /// Voting window applied to new contests.
    pub fn contest_duration(&self) -> Duration {
        self.contest_duration
    }

    /// Whether the remote backend is currently failing its health checks.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Whether writes are currently refused with [`StorageError::Degraded`].
    pub fn writes_blocked(&self) -> bool {
        self.remote.is_some() && self.is_degraded()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Entries ordered by submission time, oldest first (ties broken by id).
    pub async fn list_entries(&self) -> Vec<EntryEntity> {
        let mut entries = self
            .read_with_fallback("entries", |store| store.list_entries())
            .await;
        entries.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        entries
    }

    /// Every contest, served from the local store when the remote read fails.
    pub async fn list_contests(&self) -> Vec<ContestEntity> {
        self.read_with_fallback("contests", |store| store.list_contests())
            .await
    }

    /// Contest with the given id, if visible in the backend serving the read.
    pub async fn find_contest(&self, id: &ContestId) -> Option<ContestEntity> {
        self.read_with_fallback("contests", |store| store.find_contest(id.clone()))
            .await
    }

    /// Create a contest between `a` and `b` ending one contest duration from now.
    ///
    /// The insert is conditional: it is refused when either entry is already
    /// paired, and an error always means nothing was stored.
    pub async fn create_contest(&self, a: &EntryId, b: &EntryId) -> StorageResult<ContestEntity> {
        if a == b {
            return Err(StorageError::rejected(format!(
                "a contest needs two distinct entries, got `{a}` twice"
            )));
        }

        let store = self.writer()?;
        let created_at = SystemTime::now();
        let end_time = created_at
            .checked_add(self.contest_duration)
            .ok_or_else(|| StorageError::rejected("contest end time is out of range"))?;
        let contest = ContestEntity {
            id: ContestId::generate(),
            entry_a_id: a.clone(),
            entry_b_id: b.clone(),
            created_at,
            end_time,
        };
        store.insert_contest(contest.clone()).await?;

        info!(
            contest_id = %contest.id,
            entry_a = %a,
            entry_b = %b,
            backend = %store.kind(),
            "contest created"
        );
        Ok(contest)
    }

    /// Store a new entry in the active backend.
    pub async fn insert_entry(&self, entry: EntryEntity) -> StorageResult<EntryEntity> {
        let store = self.writer()?;
        store.insert_entry(entry.clone()).await?;
        debug!(entry_id = %entry.id, backend = %store.kind(), "entry stored");
        Ok(entry)
    }

    /// Add one vote to `id` in the active backend and return the new total.
    pub async fn increment_votes(&self, id: &EntryId) -> StorageResult<u32> {
        self.writer()?.increment_votes(id.clone()).await
    }

    fn live_remote(&self) -> Option<&Arc<dyn ArenaStore>> {
        self.remote.as_ref().filter(|_| !self.is_degraded())
    }

    fn writer(&self) -> StorageResult<&Arc<dyn ArenaStore>> {
        match &self.remote {
            Some(_) if self.is_degraded() => Err(StorageError::Degraded),
            Some(remote) => Ok(remote),
            None => Ok(&self.fallback),
        }
    }

    async fn read_with_fallback<T, F>(&self, relation: &'static str, read: F) -> T
    where
        T: Default,
        F: Fn(&dyn ArenaStore) -> BoxFuture<'static, StorageResult<T>>,
    {
        if let Some(remote) = self.live_remote() {
            match read(remote.as_ref()).await {
                Ok(rows) => return rows,
                Err(err) => warn!(
                    relation,
                    error = %err,
                    "remote read failed; serving local store"
                ),
            }
        }

        match read(self.fallback.as_ref()).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(
                    relation,
                    error = %err,
                    "local read failed; serving empty result"
                );
                T::default()
            }
        }
    }
}

#[cfg(feature = "remote-store")]
fn connect_remote(params: &RemoteConfig) -> Option<Arc<dyn ArenaStore>> {
    use crate::dao::arena_store::remote::RemoteArenaStore;

    match RemoteArenaStore::connect(params) {
        Ok(store) => {
            info!(endpoint = %params.base_url, "remote storage selected");
            Some(Arc::new(store))
        }
        Err(err) => {
            warn!(error = %err, "failed to build remote client; using local store");
            None
        }
    }
}

#[cfg(not(feature = "remote-store"))]
fn connect_remote(params: &RemoteConfig) -> Option<Arc<dyn ArenaStore>> {
    warn!(
        endpoint = %params.base_url,
        "remote storage configured but the `remote-store` feature is disabled; using local store"
    );
    None
}
