use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{Category, EntryEntity, SkillLevel, Style},
    dto::{format_system_time, validation::validate_media_url},
};

/// Payload submitted to enter a new performance into the arena.
///
/// The author is taken from the session, never from the payload.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateEntryRequest {
    /// Link to the performance video (http or https).
    #[validate(custom(function = "validate_media_url"))]
    pub video_url: String,
    /// Optional preview image.
    #[serde(default)]
    #[validate(custom(function = "validate_media_url"))]
    pub thumbnail_url: Option<String>,
    /// Performance category.
    pub category: Category,
    /// Musical style.
    pub style: Style,
    /// Declared skill level.
    pub skill_level: SkillLevel,
}

/// Entry as exposed to listing surfaces.
#[derive(Debug, Serialize, ToSchema)]
pub struct EntrySummary {
    /// Entry identifier.
    pub id: String,
    /// Identifier of the submitting user.
    pub author_id: String,
    /// Display name of the submitting user.
    pub author_name: String,
    /// Link to the performance video.
    pub video_url: String,
    /// Optional preview image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Performance category.
    pub category: Category,
    /// Musical style.
    pub style: Style,
    /// Declared skill level.
    pub skill_level: SkillLevel,
    /// Community votes received so far.
    pub votes: u32,
    /// RFC 3339 submission time.
    pub created_at: String,
}

impl From<EntryEntity> for EntrySummary {
    fn from(entry: EntryEntity) -> Self {
        Self {
            id: entry.id.to_string(),
            author_id: entry.author_id,
            author_name: entry.author_name,
            video_url: entry.video_url,
            thumbnail_url: entry.thumbnail_url,
            category: entry.category,
            style: entry.style,
            skill_level: entry.skill_level,
            votes: entry.votes,
            created_at: format_system_time(entry.created_at),
        }
    }
}

/// Entries ordered by submission time, oldest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct EntriesResponse {
    /// Every visible entry.
    pub entries: Vec<EntrySummary>,
}

/// New vote total of an entry.
#[derive(Debug, Serialize, ToSchema)]
pub struct VoteResponse {
    /// Entry that received the vote.
    pub entry_id: String,
    /// Vote total after this vote.
    pub votes: u32,
}
