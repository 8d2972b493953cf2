use std::{
    fmt,
    time::{Duration, SystemTime},
};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Opaque identifier of a submitted entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Wrap an existing identifier.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Mint a fresh identifier for a new submission.
    pub fn generate() -> Self {
        Self(format!("v-{}", Uuid::new_v4().simple()))
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier of a contest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContestId(String);

impl ContestId {
    /// Wrap an existing identifier.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Mint a fresh identifier for a new contest.
    pub fn generate() -> Self {
        Self(format!("b-{}", Uuid::new_v4().simple()))
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Performance category picked at submission time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum Category {
    /// Fast picking showcase.
    #[serde(rename = "shred")]
    Shred,
    /// Lead solo.
    #[serde(rename = "solo")]
    Solo,
    /// Riff or rhythm part.
    #[serde(rename = "riff")]
    Riff,
    /// Improvised take.
    #[serde(rename = "improviso")]
    Improv,
}

/// Musical style of the performance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    /// Rock.
    Rock,
    /// Heavy metal.
    Metal,
    /// Progressive.
    Prog,
    /// Jazz fusion.
    Fusion,
}

/// Self-declared skill level of the performer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum SkillLevel {
    /// Just starting out.
    #[serde(rename = "iniciante")]
    Beginner,
    /// Comfortable with the basics.
    #[serde(rename = "intermediário")]
    Intermediate,
    /// Seasoned player.
    #[serde(rename = "avançado")]
    Advanced,
}

/// Submitted performance, as stored in the `battle_videos` relation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntryEntity {
    /// Primary key of the entry.
    pub id: EntryId,
    /// Identifier of the submitting user; a user may own several entries.
    pub author_id: String,
    /// Display name captured when the entry was submitted.
    pub author_name: String,
    /// Link to the performance video.
    pub video_url: String,
    /// Optional preview image shown in listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Performance category.
    pub category: Category,
    /// Musical style.
    pub style: Style,
    /// Declared skill level of the author.
    pub skill_level: SkillLevel,
    /// Community votes received so far.
    #[serde(default)]
    pub votes: u32,
    /// Submission time; orders the unpaired pool.
    #[serde(with = "crate::dao::rfc3339")]
    pub created_at: SystemTime,
}

/// Head-to-head pairing of two entries.
///
/// The lifecycle status is never stored here; it is derived from `end_time`
/// on every read through [`ContestEntity::status_at`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContestEntity {
    /// Primary key of the contest.
    pub id: ContestId,
    /// Entry on side A, the older of the two.
    pub entry_a_id: EntryId,
    /// Entry on side B.
    pub entry_b_id: EntryId,
    /// Time the pairing was made.
    #[serde(with = "crate::dao::rfc3339")]
    pub created_at: SystemTime,
    /// End of the voting window.
    #[serde(with = "crate::dao::rfc3339")]
    pub end_time: SystemTime,
}

impl ContestEntity {
    /// Whether `entry` is one of the two sides of this contest.
    pub fn involves(&self, entry: &EntryId) -> bool {
        &self.entry_a_id == entry || &self.entry_b_id == entry
    }

    /// The opposing side of `entry`, if `entry` takes part in this contest.
    pub fn opponent_of(&self, entry: &EntryId) -> Option<&EntryId> {
        if &self.entry_a_id == entry {
            Some(&self.entry_b_id)
        } else if &self.entry_b_id == entry {
            Some(&self.entry_a_id)
        } else {
            None
        }
    }

    /// Lifecycle of the contest as seen at `now`.
    pub fn status_at(&self, now: SystemTime) -> ContestStatus {
        ContestStatus::at(self.end_time, now)
    }

    /// Time left in the voting window, zero once finished.
    pub fn remaining_at(&self, now: SystemTime) -> Duration {
        self.end_time.duration_since(now).unwrap_or(Duration::ZERO)
    }
}

/// Time-derived lifecycle of a contest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContestStatus {
    /// Voting is still open.
    Active,
    /// The voting window has closed.
    Finished,
}

impl ContestStatus {
    /// `Finished` from `end_time` onwards (inclusive), `Active` before.
    pub fn at(end_time: SystemTime, now: SystemTime) -> Self {
        if now >= end_time {
            ContestStatus::Finished
        } else {
            ContestStatus::Active
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::UNIX_EPOCH;

    use super::*;

    fn contest_ending_at(secs: u64) -> ContestEntity {
        ContestEntity {
            id: ContestId::new("b-1"),
            entry_a_id: EntryId::new("v-a"),
            entry_b_id: EntryId::new("v-b"),
            created_at: UNIX_EPOCH,
            end_time: UNIX_EPOCH + Duration::from_secs(secs),
        }
    }

    #[test]
    fn contest_in_the_past_is_finished() {
        let contest = contest_ending_at(100);
        let now = UNIX_EPOCH + Duration::from_secs(101);
        assert_eq!(contest.status_at(now), ContestStatus::Finished);
        assert_eq!(contest.remaining_at(now), Duration::ZERO);
    }

    #[test]
    fn contest_in_the_future_is_active() {
        let contest = contest_ending_at(100);
        let now = UNIX_EPOCH + Duration::from_secs(40);
        assert_eq!(contest.status_at(now), ContestStatus::Active);
        assert_eq!(contest.remaining_at(now), Duration::from_secs(60));
    }

    #[test]
    fn contest_exactly_at_end_time_is_finished() {
        let contest = contest_ending_at(100);
        let now = UNIX_EPOCH + Duration::from_secs(100);
        assert_eq!(contest.status_at(now), ContestStatus::Finished);
    }

    #[test]
    fn opponent_lookup() {
        let contest = contest_ending_at(1);
        assert_eq!(
            contest.opponent_of(&EntryId::new("v-a")),
            Some(&EntryId::new("v-b"))
        );
        assert_eq!(
            contest.opponent_of(&EntryId::new("v-b")),
            Some(&EntryId::new("v-a"))
        );
        assert_eq!(contest.opponent_of(&EntryId::new("v-c")), None);
        assert!(contest.involves(&EntryId::new("v-a")));
        assert!(!contest.involves(&EntryId::new("v-c")));
    }

    #[test]
    fn enums_use_stored_spellings() {
        assert_eq!(
            serde_json::to_string(&Category::Improv).unwrap(),
            "\"improviso\""
        );
        assert_eq!(
            serde_json::to_string(&SkillLevel::Advanced).unwrap(),
            "\"avançado\""
        );
        assert_eq!(serde_json::to_string(&Style::Prog).unwrap(), "\"prog\"");
    }
}
