use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dao::models::{ContestId, EntryId},
    dto::contest::{
        ContestDetail, ContestFilter, ContestsResponse, FeedbackRequest, FeedbackResponse,
    },
    error::AppError,
    services::{contest_service, feedback},
    state::SharedState,
};

/// Contest read endpoints and the feedback collaborator.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/contests", get(list_contests))
        .route("/contests/{id}", get(get_contest))
        .route("/contests/{id}/feedback", post(request_feedback))
}

/// List contests with their derived status.
#[utoipa::path(
    get,
    path = "/contests",
    tag = "contests",
    params(ContestFilter),
    responses((status = 200, description = "Contests", body = ContestsResponse))
)]
pub async fn list_contests(
    State(state): State<SharedState>,
    Query(filter): Query<ContestFilter>,
) -> Json<ContestsResponse> {
    Json(contest_service::list_contests(&state, filter).await)
}

/// Contest detail with both entries, vote shares and remaining time.
#[utoipa::path(
    get,
    path = "/contests/{id}",
    tag = "contests",
    params(("id" = String, Path, description = "Identifier of the contest")),
    responses(
        (status = 200, description = "Contest detail", body = ContestDetail),
        (status = 404, description = "Unknown contest")
    )
)]
pub async fn get_contest(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ContestDetail>, AppError> {
    Ok(Json(
        contest_service::get_contest(&state, &ContestId::new(id)).await?,
    ))
}

/// Ask the feedback judge about one side of a contest.
#[utoipa::path(
    post,
    path = "/contests/{id}/feedback",
    tag = "contests",
    params(("id" = String, Path, description = "Identifier of the contest")),
    request_body = FeedbackRequest,
    responses(
        (status = 200, description = "Verdict", body = FeedbackResponse),
        (status = 400, description = "Entry is not part of the contest"),
        (status = 404, description = "Unknown contest or entry")
    )
)]
pub async fn request_feedback(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<FeedbackRequest>>,
) -> Result<Json<FeedbackResponse>, AppError> {
    let response = feedback::request_feedback(
        &state,
        &ContestId::new(id),
        &EntryId::new(payload.entry_id),
    )
    .await?;
    Ok(Json(response))
}
