use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dao::models::EntryId,
    dto::entry::{CreateEntryRequest, EntriesResponse, EntrySummary, VoteResponse},
    error::AppError,
    routes::session::session_token,
    services::entry_service,
    state::SharedState,
};

/// Submission, listing and voting endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/entries", get(list_entries).post(submit_entry))
        .route("/entries/{id}/votes", post(vote))
}

/// List entries oldest first; pending pairings are made before listing.
#[utoipa::path(
    get,
    path = "/entries",
    tag = "entries",
    responses((status = 200, description = "Entries ordered by submission time", body = EntriesResponse))
)]
pub async fn list_entries(State(state): State<SharedState>) -> Json<EntriesResponse> {
    Json(entry_service::list_entries(&state).await)
}

/// Submit a new entry on behalf of the signed-in user.
#[utoipa::path(
    post,
    path = "/entries",
    tag = "entries",
    params(("X-Session-Token" = String, Header, description = "Token returned by POST /session")),
    request_body = CreateEntryRequest,
    responses(
        (status = 201, description = "Entry stored", body = EntrySummary),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Missing or expired session"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn submit_entry(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Valid(Json(payload)): Valid<Json<CreateEntryRequest>>,
) -> Result<(StatusCode, Json<EntrySummary>), AppError> {
    let token = session_token(&headers)?;
    let entry = entry_service::submit_entry(&state, token, payload).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Add one vote to an entry.
#[utoipa::path(
    post,
    path = "/entries/{id}/votes",
    tag = "entries",
    params(("id" = String, Path, description = "Identifier of the entry")),
    responses(
        (status = 200, description = "New vote total", body = VoteResponse),
        (status = 404, description = "Unknown entry")
    )
)]
pub async fn vote(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<VoteResponse>, AppError> {
    Ok(Json(entry_service::vote(&state, &EntryId::new(id)).await?))
}
