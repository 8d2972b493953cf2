use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Contest listing, detail and feedback payloads.
pub mod contest;
/// Entry submission, listing and vote payloads.
pub mod entry;
/// Health check payloads.
pub mod health;
/// Matchmaking run report.
pub mod matchmaking;
/// Session sign-in payloads.
pub mod session;
/// Server-sent event payloads.
pub mod sse;
/// Custom validators used by request payloads.
pub mod validation;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
