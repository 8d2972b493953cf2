//! Submission, listing and voting of entries.

use std::time::SystemTime;

use tracing::info;

use crate::{
    dao::models::{EntryEntity, EntryId},
    dto::entry::{CreateEntryRequest, EntriesResponse, EntrySummary, VoteResponse},
    error::ServiceError,
    services::matchmaking::run_matchmaking,
    state::SharedState,
};

/// List entries oldest first, pairing whatever can be paired beforehand.
pub async fn list_entries(state: &SharedState) -> EntriesResponse {
    run_matchmaking(state.storage()).await;
    let entries = state
        .storage()
        .list_entries()
        .await
        .into_iter()
        .map(EntrySummary::from)
        .collect();
    EntriesResponse { entries }
}

/// Store a new entry authored by the holder of `token`.
pub async fn submit_entry(
    state: &SharedState,
    token: &str,
    request: CreateEntryRequest,
) -> Result<EntrySummary, ServiceError> {
    let session = state
        .sessions()
        .resolve(token)
        .ok_or_else(|| ServiceError::Unauthorized("unknown or expired session".into()))?;

    let entry = EntryEntity {
        id: EntryId::generate(),
        author_id: session.user_id,
        author_name: session.display_name,
        video_url: request.video_url,
        thumbnail_url: request.thumbnail_url,
        category: request.category,
        style: request.style,
        skill_level: request.skill_level,
        votes: 0,
        created_at: SystemTime::now(),
    };

    let stored = state.storage().insert_entry(entry).await?;
    info!(entry_id = %stored.id, author_id = %stored.author_id, "entry submitted");
    Ok(stored.into())
}

/// Count one more vote for `entry_id`.
pub async fn vote(state: &SharedState, entry_id: &EntryId) -> Result<VoteResponse, ServiceError> {
    let votes = state.storage().increment_votes(entry_id).await?;
    Ok(VoteResponse {
        entry_id: entry_id.to_string(),
        votes,
    })
}
