//! In-memory [`ArenaStore`] used by unit tests, with hooks to inject failures.

use std::{
    collections::HashSet,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::{
    arena_store::{ArenaStore, BackendKind},
    models::{Category, ContestEntity, ContestId, EntryEntity, EntryId, SkillLevel, Style},
    storage::{StorageError, StorageResult},
};

/// Build an entry submitted `offset_secs` after the epoch.
pub fn entry(id: &str, author: &str, offset_secs: u64) -> EntryEntity {
    EntryEntity {
        id: EntryId::new(id),
        author_id: author.to_string(),
        author_name: format!("{author}-name"),
        video_url: format!("https://videos.example/{id}"),
        thumbnail_url: None,
        category: Category::Shred,
        style: Style::Metal,
        skill_level: SkillLevel::Intermediate,
        votes: 0,
        created_at: at(offset_secs),
    }
}

/// Timestamp `offset_secs` after the epoch.
pub fn at(offset_secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(offset_secs)
}

/// Unique, not yet created directory under the system temp dir.
pub fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("battle-arena-test-{}", Uuid::new_v4().simple()))
}

#[derive(Default)]
struct FakeTables {
    entries: Vec<EntryEntity>,
    contests: Vec<ContestEntity>,
    contest_attempts: usize,
    reject_pairs: HashSet<(EntryId, EntryId)>,
    fail_reads: bool,
    degrade_writes: bool,
    stale_contests: Option<Vec<ContestEntity>>,
}

/// Shared-memory fake; clones observe the same tables.
#[derive(Clone, Default)]
pub struct FakeArenaStore {
    tables: Arc<Mutex<FakeTables>>,
    kind: Option<BackendKind>,
}

impl FakeArenaStore {
    /// Empty store reporting itself as a local backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `kind` from [`ArenaStore::kind`] (defaults to local).
    pub fn with_kind(mut self, kind: BackendKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Seed the entries relation.
    pub fn with_entries(self, entries: Vec<EntryEntity>) -> Self {
        self.tables.lock().unwrap().entries = entries;
        self
    }

    /// Seed the contests relation.
    pub fn with_contests(self, contests: Vec<ContestEntity>) -> Self {
        self.tables.lock().unwrap().contests = contests;
        self
    }

    /// Make every insert of the (a, b) pair fail as a connectivity loss would.
    pub fn fail_pair(&self, a: &str, b: &str) {
        self.tables
            .lock()
            .unwrap()
            .reject_pairs
            .insert((EntryId::new(a), EntryId::new(b)));
    }

    /// Answer every contest insert with [`StorageError::Degraded`].
    pub fn degrade_writes(&self, degrade: bool) {
        self.tables.lock().unwrap().degrade_writes = degrade;
    }

    /// Fail every list read while set.
    pub fn fail_reads(&self, fail: bool) {
        self.tables.lock().unwrap().fail_reads = fail;
    }

    /// Serve this snapshot from `list_contests` instead of the live table,
    /// mimicking a run that read state before another run committed.
    pub fn serve_stale_contests(&self, snapshot: Vec<ContestEntity>) {
        self.tables.lock().unwrap().stale_contests = Some(snapshot);
    }

    /// Stored contests.
    pub fn contests(&self) -> Vec<ContestEntity> {
        self.tables.lock().unwrap().contests.clone()
    }

    /// Stored entries.
    pub fn entries(&self) -> Vec<EntryEntity> {
        self.tables.lock().unwrap().entries.clone()
    }

    /// Number of `insert_contest` calls received, successful or not.
    pub fn contest_attempts(&self) -> usize {
        self.tables.lock().unwrap().contest_attempts
    }

    fn unavailable() -> StorageError {
        StorageError::unavailable(
            "fake backend offline".into(),
            std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
        )
    }
}

impl ArenaStore for FakeArenaStore {
    fn kind(&self) -> BackendKind {
        self.kind.unwrap_or(BackendKind::Local)
    }

    fn list_entries(&self) -> BoxFuture<'static, StorageResult<Vec<EntryEntity>>> {
        let tables = self.tables.lock().unwrap();
        let result = if tables.fail_reads {
            Err(Self::unavailable())
        } else {
            Ok(tables.entries.clone())
        };
        Box::pin(async move { result })
    }

    fn list_contests(&self) -> BoxFuture<'static, StorageResult<Vec<ContestEntity>>> {
        let tables = self.tables.lock().unwrap();
        let result = if tables.fail_reads {
            Err(Self::unavailable())
        } else {
            Ok(tables
                .stale_contests
                .clone()
                .unwrap_or_else(|| tables.contests.clone()))
        };
        Box::pin(async move { result })
    }

    fn find_contest(
        &self,
        id: ContestId,
    ) -> BoxFuture<'static, StorageResult<Option<ContestEntity>>> {
        let tables = self.tables.lock().unwrap();
        let result = if tables.fail_reads {
            Err(Self::unavailable())
        } else {
            Ok(tables.contests.iter().find(|c| c.id == id).cloned())
        };
        Box::pin(async move { result })
    }

    fn insert_entry(&self, entry: EntryEntity) -> BoxFuture<'static, StorageResult<()>> {
        let mut tables = self.tables.lock().unwrap();
        tables.entries.push(entry);
        Box::pin(async { Ok(()) })
    }

    fn insert_contest(&self, contest: ContestEntity) -> BoxFuture<'static, StorageResult<()>> {
        let mut tables = self.tables.lock().unwrap();
        tables.contest_attempts += 1;

        let pair = (contest.entry_a_id.clone(), contest.entry_b_id.clone());
        let result = if tables.degrade_writes {
            Err(StorageError::Degraded)
        } else if tables.reject_pairs.contains(&pair) {
            Err(Self::unavailable())
        } else if tables
            .contests
            .iter()
            .any(|c| c.involves(&contest.entry_a_id) || c.involves(&contest.entry_b_id))
        {
            Err(StorageError::conflict("entry already paired"))
        } else {
            tables.contests.push(contest);
            Ok(())
        };
        Box::pin(async move { result })
    }

    fn increment_votes(&self, id: EntryId) -> BoxFuture<'static, StorageResult<u32>> {
        let mut tables = self.tables.lock().unwrap();
        let result = match tables.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.votes += 1;
                Ok(entry.votes)
            }
            None => Err(StorageError::not_found(format!("entry `{id}`"))),
        };
        Box::pin(async move { result })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let failing = self.tables.lock().unwrap().fail_reads;
        Box::pin(async move {
            if failing {
                Err(Self::unavailable())
            } else {
                Ok(())
            }
        })
    }
}
