use crate::{
    dto::session::{SessionResponse, SignInRequest},
    error::ServiceError,
    state::SharedState,
};

/// Open a simulation-mode session for the requested display name.
pub fn sign_in(state: &SharedState, request: SignInRequest) -> SessionResponse {
    state.sessions().sign_in(&request.display_name).into()
}

/// Close the session identified by `token`.
pub fn sign_out(state: &SharedState, token: &str) -> Result<(), ServiceError> {
    state
        .sessions()
        .sign_out(token)
        .map(|_| ())
        .ok_or_else(|| ServiceError::Unauthorized("unknown or expired session".into()))
}
