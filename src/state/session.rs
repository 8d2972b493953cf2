//! Simulation-mode sessions and the sign-in/sign-out event channel.

use std::time::{Duration, SystemTime};

use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

/// How long a session token stays valid after sign-in.
pub const SESSION_TTL: Duration = Duration::from_secs(3_600);

/// Namespace of the name-derived user ids.
const USER_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6d2f_8a41_3c9e_4b07_a5d1_0e7f_92c4_b318);

/// Identity handed out at sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Stable identifier used as the author of submitted entries.
    pub user_id: String,
    /// Name as typed at sign-in, trimmed.
    pub display_name: String,
    /// Opaque bearer token; never broadcast.
    pub token: String,
    /// Instant from which the token is refused.
    pub expires_at: SystemTime,
}

impl Session {
    /// Whether the token is no longer valid at `now`.
    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        now >= self.expires_at
    }
}

/// Authentication change published to every subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A session was opened.
    SignedIn {
        /// Identifier of the user.
        user_id: String,
        /// Name the user signed in with.
        display_name: String,
    },
    /// A session was closed.
    SignedOut {
        /// Identifier of the user.
        user_id: String,
    },
}

/// Owner of active sessions and of the channel announcing their changes.
///
/// Subscribers receive events through [`SessionHub::subscribe`]; dropping the
/// receiver unsubscribes. Expired sessions are swept on every sign-in.
pub struct SessionHub {
    sender: broadcast::Sender<SessionEvent>,
    sessions: DashMap<String, Session>,
}

impl SessionHub {
    /// Create a hub whose event channel buffers `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self {
            sender,
            sessions: DashMap::new(),
        }
    }

    /// Receive every subsequent sign-in and sign-out.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Open a session for `display_name`.
    ///
    /// The same name (case-insensitive) always maps to the same user id, so a
    /// returning user keeps authorship of earlier entries.
    pub fn sign_in(&self, display_name: &str) -> Session {
        let now = SystemTime::now();
        self.purge_expired(now);

        let display_name = display_name.trim().to_string();
        let user_id = user_id_for(&display_name);

        let session = Session {
            user_id: user_id.clone(),
            display_name: display_name.clone(),
            token: Uuid::new_v4().simple().to_string(),
            expires_at: now + SESSION_TTL,
        };
        self.sessions.insert(session.token.clone(), session.clone());

        info!(user_id = %user_id, "user signed in");
        self.publish(SessionEvent::SignedIn {
            user_id,
            display_name,
        });
        session
    }

    /// Close the session identified by `token`, if it exists.
    pub fn sign_out(&self, token: &str) -> Option<Session> {
        let (_, session) = self.sessions.remove(token)?;
        info!(user_id = %session.user_id, "user signed out");
        self.publish(SessionEvent::SignedOut {
            user_id: session.user_id.clone(),
        });
        Some(session)
    }

    /// Live session for `token`; expired sessions are dropped on lookup.
    pub fn resolve(&self, token: &str) -> Option<Session> {
        let session = self.sessions.get(token)?.clone();
        if session.is_expired_at(SystemTime::now()) {
            self.sessions.remove(token);
            debug!(user_id = %session.user_id, "session expired");
            return None;
        }
        Some(session)
    }

    /// Drop every session expired at `now`, returning how many were removed.
    pub fn purge_expired(&self, now: SystemTime) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired_at(now));
        let purged = before.saturating_sub(self.sessions.len());
        if purged > 0 {
            debug!(purged, "expired sessions swept");
        }
        purged
    }

    /// Number of sessions currently held.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is held.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn publish(&self, event: SessionEvent) {
        let _ = self.sender.send(event);
    }
}

/// Stable `m-` id derived from the case-folded display name.
fn user_id_for(display_name: &str) -> String {
    let folded = display_name.to_lowercase();
    format!(
        "m-{}",
        Uuid::new_v5(&USER_ID_NAMESPACE, folded.as_bytes()).simple()
    )
}
