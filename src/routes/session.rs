use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use axum_valid::Valid;

use crate::{
    dto::session::{SessionResponse, SignInRequest},
    error::AppError,
    services::session_service,
    state::SharedState,
};

/// Header carrying the token returned by `POST /session`.
pub const SESSION_TOKEN_HEADER: &str = "x-session-token";

/// Simulation-mode session endpoints.
pub fn router() -> Router<SharedState> {
    Router::new().route("/session", post(sign_in).delete(sign_out))
}

/// Sign in with a display name and receive a session token.
#[utoipa::path(
    post,
    path = "/session",
    tag = "session",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Session opened", body = SessionResponse),
        (status = 400, description = "Invalid display name")
    )
)]
pub async fn sign_in(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<SignInRequest>>,
) -> Json<SessionResponse> {
    Json(session_service::sign_in(&state, payload))
}

/// Close the session identified by the `X-Session-Token` header.
#[utoipa::path(
    delete,
    path = "/session",
    tag = "session",
    params(("X-Session-Token" = String, Header, description = "Token returned by POST /session")),
    responses(
        (status = 204, description = "Session closed"),
        (status = 401, description = "Unknown or expired session")
    )
)]
pub async fn sign_out(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let token = session_token(&headers)?;
    session_service::sign_out(&state, token)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Read the session token header, failing with 401 when absent.
pub fn session_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(SESSION_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            AppError::Unauthorized("missing session token header `X-Session-Token`".into())
        })
}
