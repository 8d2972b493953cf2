//! Read-side projections of contests.

use std::time::SystemTime;

use crate::{
    dao::models::{ContestEntity, ContestId, ContestStatus, EntryEntity, EntryId},
    dto::contest::{ContestDetail, ContestFilter, ContestSummary, ContestsResponse},
    error::ServiceError,
    services::matchmaking::run_matchmaking,
    state::SharedState,
};

/// List contests with their status derived now, pairing new entries beforehand.
pub async fn list_contests(state: &SharedState, filter: ContestFilter) -> ContestsResponse {
    run_matchmaking(state.storage()).await;

    let now = SystemTime::now();
    let contests = state
        .storage()
        .list_contests()
        .await
        .iter()
        .map(|contest| ContestSummary::at(contest, now))
        .filter(|summary| filter.status.is_none_or(|status| summary.status == status))
        .collect();
    ContestsResponse { contests }
}

/// Contest `id` with both sides, vote shares and, once finished, the winner.
pub async fn get_contest(state: &SharedState, id: &ContestId) -> Result<ContestDetail, ServiceError> {
    let storage = state.storage();
    let contest = storage
        .find_contest(id)
        .await
        .ok_or_else(|| ServiceError::NotFound(format!("contest `{id}`")))?;

    let entries = storage.list_entries().await;
    let side = |entry_id: &EntryId| entries.iter().find(|entry| &entry.id == entry_id).cloned();
    let entry_a = side(&contest.entry_a_id);
    let entry_b = side(&contest.entry_b_id);

    Ok(detail(&contest, entry_a, entry_b, SystemTime::now()))
}

fn detail(
    contest: &ContestEntity,
    entry_a: Option<EntryEntity>,
    entry_b: Option<EntryEntity>,
    now: SystemTime,
) -> ContestDetail {
    let votes_a = entry_a.as_ref().map_or(0, |entry| entry.votes);
    let votes_b = entry_b.as_ref().map_or(0, |entry| entry.votes);
    let (share_a, share_b) = vote_shares(votes_a, votes_b);
    let summary = ContestSummary::at(contest, now);

    let winner_id = match summary.status {
        ContestStatus::Finished if votes_a > votes_b => Some(contest.entry_a_id.to_string()),
        ContestStatus::Finished if votes_b > votes_a => Some(contest.entry_b_id.to_string()),
        _ => None,
    };

    ContestDetail {
        contest: summary,
        entry_a: entry_a.map(Into::into),
        entry_b: entry_b.map(Into::into),
        share_a,
        share_b,
        winner_id,
    }
}

/// Rounded percentages of the two vote counts; an even split before any vote.
fn vote_shares(a: u32, b: u32) -> (u8, u8) {
    let total = u64::from(a) + u64::from(b);
    if total == 0 {
        return (50, 50);
    }
    let share_a = ((u64::from(a) * 200 + total) / (total * 2)) as u8;
    (share_a, 100 - share_a)
}
