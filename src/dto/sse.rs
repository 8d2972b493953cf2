use serde::Serialize;
use utoipa::ToSchema;

use crate::state::SessionEvent;

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    /// Optional SSE event name.
    pub event: Option<String>,
    /// Serialized payload.
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Identifier of the SSE stream.
    pub stream: String,
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the remote backend is currently failing.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a user signs in or out. Tokens are never included.
pub struct SessionNotice {
    /// User the event is about.
    pub user_id: String,
    /// Display name, only sent on sign-in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl SessionEvent {
    /// SSE event name: `signed_in` or `signed_out`.
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::SignedIn { .. } => "signed_in",
            SessionEvent::SignedOut { .. } => "signed_out",
        }
    }

    /// Public projection of the event, without the token.
    pub fn notice(&self) -> SessionNotice {
        match self {
            SessionEvent::SignedIn {
                user_id,
                display_name,
            } => SessionNotice {
                user_id: user_id.clone(),
                display_name: Some(display_name.clone()),
            },
            SessionEvent::SignedOut { user_id } => SessionNotice {
                user_id: user_id.clone(),
                display_name: None,
            },
        }
    }
}

impl TryFrom<SessionEvent> for ServerEvent {
    type Error = serde_json::Error;

    fn try_from(event: SessionEvent) -> Result<Self, Self::Error> {
        ServerEvent::json(event.name().to_string(), &event.notice())
    }
}
