use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report which backend serves requests, pinging the remote one when configured.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let storage = state.storage();
    let Some(remote) = storage.remote() else {
        return HealthResponse::local();
    };

    if let Err(err) = remote.health_check().await {
        warn!(error = %err, "remote storage health check failed");
    }

    if storage.is_degraded() {
        HealthResponse::degraded()
    } else {
        HealthResponse::ok()
    }
}
