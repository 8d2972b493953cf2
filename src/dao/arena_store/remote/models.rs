use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::dao::models::{ContestEntity, ContestId, EntryId};

/// Relation holding submitted entries.
pub const ENTRY_TABLE: &str = "battle_videos";
/// Relation holding contests.
pub const CONTEST_TABLE: &str = "battles";
/// Stored procedure incrementing an entry's vote counter atomically.
pub const INCREMENT_VOTES_RPC: &str = "rpc/increment_votes";
/// Column list requested when reading contests.
pub const CONTEST_COLUMNS: &str = "id,player_a_id,player_b_id,end_time,created_at";

/// Value written to the legacy `status` column; reads derive status from `end_time`.
const STORED_ACTIVE_STATUS: &str = "active";

/// Row of the `battles` relation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContestRow {
    /// Primary key.
    pub id: ContestId,
    /// Entry on side A.
    pub player_a_id: EntryId,
    /// Entry on side B.
    pub player_b_id: EntryId,
    /// Legacy status column, written as `active` and ignored on read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// End of the voting window.
    #[serde(with = "crate::dao::rfc3339")]
    pub end_time: SystemTime,
    /// Time the pairing was made.
    #[serde(with = "crate::dao::rfc3339")]
    pub created_at: SystemTime,
}

impl From<ContestEntity> for ContestRow {
    fn from(contest: ContestEntity) -> Self {
        Self {
            id: contest.id,
            player_a_id: contest.entry_a_id,
            player_b_id: contest.entry_b_id,
            status: Some(STORED_ACTIVE_STATUS.to_string()),
            end_time: contest.end_time,
            created_at: contest.created_at,
        }
    }
}

impl From<ContestRow> for ContestEntity {
    fn from(row: ContestRow) -> Self {
        Self {
            id: row.id,
            entry_a_id: row.player_a_id,
            entry_b_id: row.player_b_id,
            created_at: row.created_at,
            end_time: row.end_time,
        }
    }
}

/// Body of the `increment_votes` stored procedure call.
#[derive(Debug, Serialize)]
pub struct IncrementVotesArgs<'a> {
    /// Entry receiving the vote.
    pub entry_id: &'a EntryId,
}

/// Filter matching contests that reference either entry, e.g.
/// `(player_a_id.in.("v-1","v-2"),player_b_id.in.("v-1","v-2"))`.
pub fn busy_filter(a: &EntryId, b: &EntryId) -> String {
    let ids = format!("{},{}", quote(a.as_str()), quote(b.as_str()));
    format!("(player_a_id.in.({ids}),player_b_id.in.({ids}))")
}

/// `eq.` filter for a single column value.
pub fn eq_filter(value: &str) -> String {
    format!("eq.{}", quote(value))
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
