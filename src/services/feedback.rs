//! Automated judging of one side of a contest.

use futures::future::BoxFuture;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    dao::models::{ContestId, EntryEntity, EntryId},
    dto::contest::FeedbackResponse,
    error::ServiceError,
    state::SharedState,
};

/// Lowest score a verdict may carry.
pub const MIN_SCORE: f32 = 1.0;
/// Highest score a verdict may carry.
pub const MAX_SCORE: f32 = 10.0;

/// What the judge is asked to assess.
#[derive(Debug, Clone)]
pub struct JudgeRequest {
    /// Entry being judged.
    pub player: EntryEntity,
    /// The other side of the contest.
    pub opponent: EntryEntity,
    /// Community votes received by `player`.
    pub votes: u32,
    /// Whether `player` holds strictly more votes than `opponent`.
    pub won: bool,
}

/// Structured judgment of a single performance.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    /// Short positive point, for the public.
    pub public_highlight: String,
    /// Short point to work on, for the public.
    pub public_improvement: String,
    /// Detailed breakdown for the performer.
    pub technical_analysis: String,
    /// Concrete exercise to practise next.
    pub practical_suggestion: String,
    /// Score between [`MIN_SCORE`] and [`MAX_SCORE`] once clamped.
    pub technical_score: f32,
}

impl Verdict {
    /// Canned verdict served whenever the judge cannot answer.
    pub fn fallback() -> Self {
        Self {
            public_highlight: "Great technical control.".into(),
            public_improvement: "Work on rhythmic consistency.".into(),
            technical_analysis: "Your alternate picking shows promise, but hand synchronization at high speeds needs refinement.".into(),
            practical_suggestion: "Practice scalar runs with a metronome at 5bpm increments.".into(),
            technical_score: 7.5,
        }
    }

    /// Pull the score into `MIN_SCORE..=MAX_SCORE`; a NaN score becomes the minimum.
    pub fn clamped(mut self) -> Self {
        self.technical_score = if self.technical_score.is_nan() {
            MIN_SCORE
        } else {
            self.technical_score.clamp(MIN_SCORE, MAX_SCORE)
        };
        self
    }
}

/// Why the judge could not produce a verdict.
#[derive(Debug, Error)]
pub enum JudgeError {
    /// The judge could not be reached.
    #[error("judge unavailable: {0}")]
    Unavailable(String),
    /// The judge answered with something that is not a verdict.
    #[error("judge returned an unusable answer: {0}")]
    Malformed(String),
}

/// Collaborator producing a [`Verdict`] for one side of a contest.
pub trait FeedbackJudge: Send + Sync {
    /// Judge one side of a contest.
    fn judge(&self, request: JudgeRequest) -> BoxFuture<'static, Result<Verdict, JudgeError>>;
}

/// Judge that always answers with [`Verdict::fallback`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackJudge;

impl FeedbackJudge for FallbackJudge {
    fn judge(&self, _request: JudgeRequest) -> BoxFuture<'static, Result<Verdict, JudgeError>> {
        Box::pin(async { Ok(Verdict::fallback()) })
    }
}

/// Judge the side `entry_id` of contest `contest_id`.
///
/// The player wins when it holds strictly more votes than its opponent. A
/// failing judge is logged and replaced by the fallback verdict.
pub async fn request_feedback(
    state: &SharedState,
    contest_id: &ContestId,
    entry_id: &EntryId,
) -> Result<FeedbackResponse, ServiceError> {
    let storage = state.storage();
    let contest = storage
        .find_contest(contest_id)
        .await
        .ok_or_else(|| ServiceError::NotFound(format!("contest `{contest_id}`")))?;
    let opponent_id = contest.opponent_of(entry_id).ok_or_else(|| {
        ServiceError::InvalidInput(format!(
            "entry `{entry_id}` does not take part in contest `{contest_id}`"
        ))
    })?;

    let entries = storage.list_entries().await;
    let find = |id: &EntryId| {
        entries
            .iter()
            .find(|entry| &entry.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("entry `{id}`")))
    };
    let player = find(entry_id)?;
    let opponent = find(opponent_id)?;

    let request = JudgeRequest {
        votes: player.votes,
        won: player.votes > opponent.votes,
        player,
        opponent,
    };
    let won = request.won;
    let votes = request.votes;

    let verdict = match state.judge().judge(request).await {
        Ok(verdict) => verdict,
        Err(err) => {
            warn!(
                contest_id = %contest_id,
                entry_id = %entry_id,
                error = %err,
                "feedback judge failed; serving fallback verdict"
            );
            Verdict::fallback()
        }
    }
    .clamped();

    info!(contest_id = %contest_id, entry_id = %entry_id, won, "feedback produced");
    Ok(FeedbackResponse::new(contest_id, entry_id, votes, won, verdict))
}
