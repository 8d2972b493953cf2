use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    dao::models::{ContestEntity, ContestId, ContestStatus, EntryId},
    dto::{entry::EntrySummary, format_system_time},
    services::feedback::Verdict,
};

/// Optional filter of the contest listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ContestFilter {
    /// Only return contests in this lifecycle state.
    pub status: Option<ContestStatus>,
}

/// Contest with its lifecycle derived at read time.
#[derive(Debug, Serialize, ToSchema)]
pub struct ContestSummary {
    /// Contest identifier.
    pub id: String,
    /// Entry on side A.
    pub entry_a_id: String,
    /// Entry on side B.
    pub entry_b_id: String,
    /// Lifecycle derived from `end_time` at read time.
    pub status: ContestStatus,
    /// RFC 3339 pairing time.
    pub created_at: String,
    /// RFC 3339 end of the voting window.
    pub end_time: String,
    /// Seconds left in the voting window, zero once finished.
    pub remaining_secs: u64,
}

impl ContestSummary {
    /// Project `contest` as seen at `now`.
    pub fn at(contest: &ContestEntity, now: SystemTime) -> Self {
        Self {
            id: contest.id.to_string(),
            entry_a_id: contest.entry_a_id.to_string(),
            entry_b_id: contest.entry_b_id.to_string(),
            status: contest.status_at(now),
            created_at: format_system_time(contest.created_at),
            end_time: format_system_time(contest.end_time),
            remaining_secs: contest.remaining_at(now).as_secs(),
        }
    }
}

/// Contests matching the listing filter.
#[derive(Debug, Serialize, ToSchema)]
pub struct ContestsResponse {
    /// Matching contests, in storage order.
    pub contests: Vec<ContestSummary>,
}

/// Contest with both sides resolved, as shown on the contest page.
#[derive(Debug, Serialize, ToSchema)]
pub struct ContestDetail {
    /// The contest itself.
    pub contest: ContestSummary,
    /// Missing when the entry is not visible in the backend serving the read.
    pub entry_a: Option<EntrySummary>,
    /// Side B, same rule as `entry_a`.
    pub entry_b: Option<EntrySummary>,
    /// Percentage of votes held by side A (50 when nobody voted yet).
    pub share_a: u8,
    /// Percentage of votes held by side B.
    pub share_b: u8,
    /// Side with strictly more votes, once the contest is finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_id: Option<String>,
}

/// Request to judge one side of a contest.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct FeedbackRequest {
    /// Entry to judge; must be one of the two sides.
    #[validate(length(min = 1, max = 64))]
    pub entry_id: String,
}

/// Verdict on one side of a contest.
#[derive(Debug, Serialize, ToSchema)]
pub struct FeedbackResponse {
    /// Contest the entry belongs to.
    pub contest_id: String,
    /// Judged entry.
    pub entry_id: String,
    /// Community votes received by the entry.
    pub votes: u32,
    /// Whether the entry holds strictly more votes than its opponent.
    pub won: bool,
    /// Short positive point, for the public.
    pub public_highlight: String,
    /// Short point to work on, for the public.
    pub public_improvement: String,
    /// Detailed breakdown for the performer.
    pub technical_analysis: String,
    /// Concrete exercise to practise next.
    pub practical_suggestion: String,
    /// Score between 1 and 10.
    pub technical_score: f32,
}

impl FeedbackResponse {
    /// Combine the contest context with the judge's verdict.
    pub fn new(
        contest_id: &ContestId,
        entry_id: &EntryId,
        votes: u32,
        won: bool,
        verdict: Verdict,
    ) -> Self {
        Self {
            contest_id: contest_id.to_string(),
            entry_id: entry_id.to_string(),
            votes,
            won,
            public_highlight: verdict.public_highlight,
            public_improvement: verdict.public_improvement,
            technical_analysis: verdict.technical_analysis,
            practical_suggestion: verdict.practical_suggestion,
            technical_score: verdict.technical_score,
        }
    }
}
