use serde::Serialize;
use utoipa::ToSchema;

/// Outcome of one matchmaking run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct MatchmakingReport {
    /// Contests created by the run; zero is a normal outcome.
    pub created: u32,
}
