use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::matchmaking::MatchmakingReport, services::matchmaking::run_matchmaking,
    state::SharedState,
};

/// Explicit trigger of a matchmaking run.
pub fn router() -> Router<SharedState> {
    Router::new().route("/matchmaking/run", post(run))
}

/// Pair every entry that can be paired now and report how many contests were created.
#[utoipa::path(
    post,
    path = "/matchmaking/run",
    tag = "matchmaking",
    responses((status = 200, description = "Run finished", body = MatchmakingReport))
)]
pub async fn run(State(state): State<SharedState>) -> Json<MatchmakingReport> {
    Json(run_matchmaking(state.storage()).await)
}
