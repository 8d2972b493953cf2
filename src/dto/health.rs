use serde::Serialize;
use utoipa::ToSchema;

use crate::dao::arena_store::BackendKind;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "ok" (remote healthy), "degraded" (remote failing) or "local" (no remote configured).
    pub status: String,
    /// Backend currently serving writes ("remote" or "local").
    pub backend: String,
}

impl HealthResponse {
    /// Remote backend configured and healthy.
    pub fn ok() -> Self {
        Self::new("ok", BackendKind::Remote)
    }

    /// Remote backend configured but failing; reads are served locally.
    pub fn degraded() -> Self {
        Self::new("degraded", BackendKind::Local)
    }

    /// No remote backend; the local store is the system of record.
    pub fn local() -> Self {
        Self::new("local", BackendKind::Local)
    }

    fn new(status: &str, backend: BackendKind) -> Self {
        Self {
            status: status.to_string(),
            backend: backend.to_string(),
        }
    }
}
