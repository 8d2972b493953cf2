//! Greedy pairing of unpaired entries into contests.

use std::collections::HashSet;

use tracing::{debug, info, instrument, warn};

use crate::{
    dao::{
        arena_store::ArenaStorage,
        models::{EntryEntity, EntryId},
        storage::StorageError,
    },
    dto::matchmaking::MatchmakingReport,
};

/// Pair every unpaired entry that can be paired, oldest submissions first.
///
/// Each entry is offered to the earliest eligible partner (different author,
/// not consumed earlier in this run). A failed contest write is never fatal:
/// the scan moves on to the next candidate and the entry stays unpaired until
/// a later run, except in degraded mode where the whole run stops. The busy
/// set is recomputed from storage on every call, so the operation can be
/// repeated freely.
#[instrument(name = "matchmaking", skip_all)]
pub async fn run_matchmaking(storage: &ArenaStorage) -> MatchmakingReport {
    if storage.writes_blocked() {
        warn!("remote storage degraded; skipping matchmaking run");
        return MatchmakingReport { created: 0 };
    }

    let contests = storage.list_contests().await;
    let busy = contests
        .iter()
        .flat_map(|contest| [&contest.entry_a_id, &contest.entry_b_id])
        .collect::<HashSet<&EntryId>>();

    let entries = storage.list_entries().await;
    let orphans = entries
        .iter()
        .filter(|entry| !busy.contains(&entry.id))
        .collect::<Vec<&EntryEntity>>();

    if orphans.len() < 2 {
        debug!(orphans = orphans.len(), "not enough unpaired entries");
        return MatchmakingReport { created: 0 };
    }

    let mut assigned = HashSet::<&EntryId>::new();
    let mut created = 0;

    'scan: for (i, first) in orphans.iter().enumerate() {
        if assigned.contains(&first.id) {
            continue;
        }

        for second in &orphans[i + 1..] {
            if assigned.contains(&second.id) || first.author_id == second.author_id {
                continue;
            }

            match storage.create_contest(&first.id, &second.id).await {
                Ok(contest) => {
                    debug!(
                        contest_id = %contest.id,
                        entry_a = %first.id,
                        entry_b = %second.id,
                        "entries paired"
                    );
                    assigned.insert(&first.id);
                    assigned.insert(&second.id);
                    created += 1;
                    break;
                }
                Err(StorageError::Degraded) => {
                    warn!("remote storage degraded mid-run; stopping matchmaking");
                    break 'scan;
                }
                Err(err) => warn!(
                    entry_a = %first.id,
                    entry_b = %second.id,
                    error = %err,
                    "pairing attempt failed; trying next candidate"
                ),
            }
        }
    }

    info!(created, orphans = orphans.len(), "matchmaking run finished");
    MatchmakingReport { created }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc, time::Duration};

    use super::*;
    use crate::dao::{
        arena_store::{
            ArenaStore, BackendKind,
            fake::{FakeArenaStore, at, entry, scratch_dir},
            local::LocalArenaStore,
        },
        models::{ContestEntity, ContestId},
    };

    const WINDOW: Duration = Duration::from_secs(48 * 3_600);

    fn local_storage(fake: &FakeArenaStore) -> ArenaStorage {
        ArenaStorage::new(None, Arc::new(fake.clone()), WINDOW)
    }

    fn pairs(contests: &[ContestEntity]) -> Vec<(String, String)> {
        let mut pairs = contests
            .iter()
            .map(|c| (c.entry_a_id.to_string(), c.entry_b_id.to_string()))
            .collect::<Vec<_>>();
        pairs.sort();
        pairs
    }

    fn pair(a: &str, b: &str) -> (String, String) {
        (a.to_string(), b.to_string())
    }

    fn assert_each_entry_paired_at_most_once(contests: &[ContestEntity]) {
        let mut seen = HashMap::<&EntryId, &ContestId>::new();
        for contest in contests {
            for id in [&contest.entry_a_id, &contest.entry_b_id] {
                if let Some(previous) = seen.insert(id, &contest.id) {
                    panic!("entry {id} paired by both {previous} and {}", contest.id);
                }
            }
        }
    }

    fn assert_no_self_pairing(contests: &[ContestEntity], entries: &[EntryEntity]) {
        let author = |id: &EntryId| {
            entries
                .iter()
                .find(|e| &e.id == id)
                .map(|e| e.author_id.clone())
        };
        for contest in contests {
            assert_ne!(
                author(&contest.entry_a_id),
                author(&contest.entry_b_id),
                "contest {} pairs an author with themselves",
                contest.id
            );
        }
    }

    #[tokio::test]
    async fn fewer_than_two_orphans_means_no_writes() {
        for pool in [vec![], vec![entry("v-a", "author1", 1)]] {
            let fake = FakeArenaStore::new().with_entries(pool);
            let report = run_matchmaking(&local_storage(&fake)).await;

            assert_eq!(report, MatchmakingReport { created: 0 });
            assert_eq!(fake.contest_attempts(), 0);
        }
    }

    #[tokio::test]
    async fn busy_entries_do_not_count_as_orphans() {
        let fake = FakeArenaStore::new()
            .with_entries(vec![
                entry("v-a", "author1", 1),
                entry("v-b", "author2", 2),
                entry("v-c", "author3", 3),
            ])
            .with_contests(vec![ContestEntity {
                id: ContestId::new("b-old"),
                entry_a_id: EntryId::new("v-a"),
                entry_b_id: EntryId::new("v-b"),
                created_at: at(10),
                end_time: at(10) + WINDOW,
            }]);

        let report = run_matchmaking(&local_storage(&fake)).await;

        assert_eq!(report.created, 0);
        assert_eq!(fake.contest_attempts(), 0);
    }

    #[tokio::test]
    async fn oldest_entries_pair_with_first_eligible_partner() {
        let fake = FakeArenaStore::new().with_entries(vec![
            entry("v-d", "author3", 4),
            entry("v-b", "author2", 2),
            entry("v-c", "author1", 3),
            entry("v-a", "author1", 1),
        ]);

        let report = run_matchmaking(&local_storage(&fake)).await;

        assert_eq!(report.created, 2);
        assert_eq!(
            pairs(&fake.contests()),
            vec![pair("v-a", "v-b"), pair("v-c", "v-d")]
        );
    }

    #[tokio::test]
    async fn same_author_entries_are_never_paired() {
        let fake = FakeArenaStore::new().with_entries(vec![
            entry("v-a", "author1", 1),
            entry("v-b", "author1", 2),
            entry("v-c", "author2", 3),
        ]);

        let report = run_matchmaking(&local_storage(&fake)).await;

        assert_eq!(report.created, 1);
        assert_eq!(pairs(&fake.contests()), vec![pair("v-a", "v-c")]);
        assert_no_self_pairing(&fake.contests(), &fake.entries());
    }

    #[tokio::test]
    async fn second_run_without_new_entries_creates_nothing() {
        let fake = FakeArenaStore::new().with_entries(vec![
            entry("v-a", "author1", 1),
            entry("v-b", "author2", 2),
            entry("v-c", "author3", 3),
        ]);
        let storage = local_storage(&fake);

        assert_eq!(run_matchmaking(&storage).await.created, 1);
        let attempts = fake.contest_attempts();

        assert_eq!(run_matchmaking(&storage).await.created, 0);
        assert_eq!(fake.contest_attempts(), attempts);
    }

    #[tokio::test]
    async fn failed_write_moves_on_to_the_next_candidate() {
        let fake = FakeArenaStore::new().with_entries(vec![
            entry("v-a", "author1", 1),
            entry("v-b", "author2", 2),
            entry("v-c", "author3", 3),
        ]);
        fake.fail_pair("v-a", "v-b");

        let report = run_matchmaking(&local_storage(&fake)).await;

        assert_eq!(report.created, 1);
        assert_eq!(pairs(&fake.contests()), vec![pair("v-a", "v-c")]);
        assert_eq!(fake.contest_attempts(), 2);
    }

    #[tokio::test]
    async fn every_write_failing_is_a_silent_zero() {
        let fake = FakeArenaStore::new().with_entries(vec![
            entry("v-a", "author1", 1),
            entry("v-b", "author2", 2),
        ]);
        fake.fail_pair("v-a", "v-b");

        let report = run_matchmaking(&local_storage(&fake)).await;

        assert_eq!(report.created, 0);
        assert!(fake.contests().is_empty());
    }

    #[tokio::test]
    async fn unreadable_storage_yields_zero() {
        let fake = FakeArenaStore::new().with_entries(vec![
            entry("v-a", "author1", 1),
            entry("v-b", "author2", 2),
        ]);
        fake.fail_reads(true);

        assert_eq!(run_matchmaking(&local_storage(&fake)).await.created, 0);
        assert_eq!(fake.contest_attempts(), 0);
    }

    #[tokio::test]
    async fn degraded_remote_skips_the_run_without_touching_storage() {
        let pool = vec![
            entry("v-a", "author1", 1),
            entry("v-b", "author2", 2),
            entry("v-c", "author3", 3),
            entry("v-d", "author4", 4),
        ];
        let remote = FakeArenaStore::new()
            .with_entries(pool.clone())
            .with_kind(BackendKind::Remote);
        let local = FakeArenaStore::new().with_entries(pool);
        let storage = ArenaStorage::new(
            Some(Arc::new(remote.clone())),
            Arc::new(local.clone()),
            WINDOW,
        );
        storage.update_degraded(true);

        let report = run_matchmaking(&storage).await;

        assert_eq!(report.created, 0);
        assert_eq!(remote.contest_attempts(), 0);
        assert_eq!(local.contest_attempts(), 0);

        storage.update_degraded(false);
        assert_eq!(run_matchmaking(&storage).await.created, 2);
        assert_eq!(remote.contest_attempts(), 2);
        assert!(local.contests().is_empty());
    }

    #[tokio::test]
    async fn degradation_during_a_run_stops_the_scan() {
        let fake = FakeArenaStore::new().with_entries(vec![
            entry("v-a", "author1", 1),
            entry("v-b", "author2", 2),
            entry("v-c", "author3", 3),
            entry("v-d", "author4", 4),
            entry("v-e", "author5", 5),
        ]);
        fake.degrade_writes(true);

        let report = run_matchmaking(&local_storage(&fake)).await;

        assert_eq!(report.created, 0);
        assert_eq!(fake.contest_attempts(), 1);
    }

    #[tokio::test]
    async fn degraded_local_fallback_alone_still_pairs() {
        let fake = FakeArenaStore::new().with_entries(vec![
            entry("v-a", "author1", 1),
            entry("v-b", "author2", 2),
        ]);
        let storage = local_storage(&fake);
        storage.update_degraded(true);

        assert!(!storage.writes_blocked());
        assert_eq!(run_matchmaking(&storage).await.created, 1);
    }

    #[tokio::test]
    async fn overlapping_snapshots_never_double_pair() {
        let fake = FakeArenaStore::new().with_entries(vec![
            entry("v-a", "author1", 1),
            entry("v-b", "author2", 2),
            entry("v-c", "author3", 3),
            entry("v-d", "author4", 4),
            entry("v-e", "author5", 5),
        ]);
        let storage = local_storage(&fake);

        assert_eq!(run_matchmaking(&storage).await.created, 2);

        // A second run that read the contest relation before the first committed.
        fake.serve_stale_contests(Vec::new());
        let late = run_matchmaking(&storage).await;

        assert_eq!(late.created, 0);
        let contests = fake.contests();
        assert_eq!(contests.len(), 2);
        assert_each_entry_paired_at_most_once(&contests);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_runs_on_local_store_keep_pairings_unique() {
        let local = LocalArenaStore::open(scratch_dir());
        for (index, author) in ["p1", "p2", "p3", "p1", "p4", "p5", "p2", "p6"]
            .iter()
            .enumerate()
        {
            local
                .insert_entry(entry(&format!("v-{index}"), author, index as u64))
                .await
                .unwrap();
        }
        let storage = Arc::new(ArenaStorage::new(None, Arc::new(local.clone()), WINDOW));

        let runs = (0..4)
            .map(|_| {
                let storage = storage.clone();
                tokio::spawn(async move { run_matchmaking(&storage).await.created })
            })
            .collect::<Vec<_>>();
        let mut created = 0;
        for run in runs {
            created += run.await.unwrap();
        }

        let contests = local.list_contests().await.unwrap();
        assert_eq!(created as usize, contests.len());
        assert_eq!(contests.len(), 4);
        assert_each_entry_paired_at_most_once(&contests);
        assert_no_self_pairing(&contests, &local.list_entries().await.unwrap());
        let _ = std::fs::remove_dir_all(local.data_dir());
    }

    #[tokio::test]
    async fn local_and_remote_pools_pair_identically() {
        let pool = vec![
            entry("v-a", "author1", 1),
            entry("v-b", "author1", 2),
            entry("v-c", "author2", 3),
            entry("v-d", "author3", 4),
            entry("v-e", "author2", 5),
            entry("v-f", "author4", 6),
        ];

        let local = FakeArenaStore::new().with_entries(pool.clone());
        let local_report = run_matchmaking(&local_storage(&local)).await;

        let remote = FakeArenaStore::new()
            .with_entries(pool.into_iter().rev().collect())
            .with_kind(BackendKind::Remote);
        let remote_storage = ArenaStorage::new(
            Some(Arc::new(remote.clone())),
            Arc::new(FakeArenaStore::new()),
            WINDOW,
        );
        assert_eq!(remote_storage.active_backend(), BackendKind::Remote);
        let remote_report = run_matchmaking(&remote_storage).await;

        assert_eq!(local_report, remote_report);
        assert_eq!(pairs(&local.contests()), pairs(&remote.contests()));
        assert_eq!(
            pairs(&local.contests()),
            vec![pair("v-a", "v-c"), pair("v-b", "v-d"), pair("v-e", "v-f")]
        );
    }

    #[cfg(feature = "remote-store")]
    #[tokio::test]
    async fn fallback_pairing_matches_rest_backend() {
        use crate::dao::arena_store::remote::emulator::Emulator;

        let pool = vec![
            entry("v-a", "author1", 1),
            entry("v-b", "author2", 2),
            entry("v-c", "author1", 3),
            entry("v-d", "author3", 4),
        ];

        let emulator = Emulator::start().await;
        let rest = emulator.store();
        for item in pool.iter().rev() {
            rest.insert_entry(item.clone()).await.unwrap();
        }
        let remote_storage = ArenaStorage::new(
            Some(Arc::new(rest.clone())),
            Arc::new(FakeArenaStore::new()),
            WINDOW,
        );

        let dir = scratch_dir();
        let disk = LocalArenaStore::open(&dir);
        for item in &pool {
            disk.insert_entry(item.clone()).await.unwrap();
        }
        let local_storage = ArenaStorage::new(None, Arc::new(disk.clone()), WINDOW);

        let remote_report = run_matchmaking(&remote_storage).await;
        let local_report = run_matchmaking(&local_storage).await;

        assert_eq!(remote_report, MatchmakingReport { created: 2 });
        assert_eq!(local_report, remote_report);
        assert_eq!(
            pairs(&rest.list_contests().await.unwrap()),
            pairs(&disk.list_contests().await.unwrap())
        );
        let _ = std::fs::remove_dir_all(dir);
    }

    #[cfg(feature = "remote-store")]
    #[tokio::test]
    async fn remote_uniqueness_blocks_a_stale_second_run() {
        use crate::dao::arena_store::remote::emulator::Emulator;

        let emulator = Emulator::start().await;
        let rest = emulator.store();
        for item in [
            entry("v-a", "author1", 1),
            entry("v-b", "author2", 2),
            entry("v-c", "author3", 3),
        ] {
            rest.insert_entry(item).await.unwrap();
        }
        let storage = ArenaStorage::new(
            Some(Arc::new(rest.clone())),
            Arc::new(FakeArenaStore::new()),
            WINDOW,
        );

        assert_eq!(run_matchmaking(&storage).await.created, 1);
        emulator.hide_contests_from_reads(true);
        assert_eq!(run_matchmaking(&storage).await.created, 0);

        emulator.hide_contests_from_reads(false);
        let contests = rest.list_contests().await.unwrap();
        assert_eq!(contests.len(), 1);
        assert_each_entry_paired_at_most_once(&contests);
    }
}
