use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::{format_system_time, validation::validate_display_name},
    state::Session,
};

/// Simulation-mode sign-in: a display name is all it takes.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SignInRequest {
    /// Name shown to other users; 1 to 40 visible characters.
    #[validate(custom(function = "validate_display_name"))]
    pub display_name: String,
}

/// Session handed back at sign-in; `token` goes into the `x-session-token` header.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    /// Stable identifier derived from the display name.
    pub user_id: String,
    /// Display name as submitted.
    pub display_name: String,
    /// Opaque session token.
    pub token: String,
    /// RFC 3339 expiry of the token.
    pub expires_at: String,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            user_id: session.user_id,
            display_name: session.display_name,
            token: session.token,
            expires_at: format_system_time(session.expires_at),
        }
    }
}
