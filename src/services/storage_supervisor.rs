use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::arena_store::{ArenaStorage, ArenaStore},
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);

/// Retry pacing used after a failed health check.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    /// Delay before the first retry.
    pub initial: Duration,
    /// Upper bound of the doubling delay.
    pub max: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: INITIAL_DELAY,
            max: MAX_DELAY,
        }
    }
}

/// Poll the remote backend forever, toggling degraded mode as its health changes.
///
/// Returns immediately when no remote backend is configured.
pub async fn run(state: SharedState) {
    let storage = state.storage();
    let Some(remote) = storage.remote() else {
        info!("no remote storage configured; storage supervisor idle");
        return;
    };

    supervise(
        storage,
        remote.as_ref(),
        state.config().health_poll_interval(),
        Backoff::default(),
    )
    .await;
}

/// Health-poll loop: one failure enters degraded mode, the next success leaves it.
pub async fn supervise(
    storage: &ArenaStorage,
    remote: &dyn ArenaStore,
    poll_interval: Duration,
    backoff: Backoff,
) {
    let mut delay = backoff.initial;

    loop {
        match remote.health_check().await {
            Ok(()) => {
                if storage.is_degraded() {
                    info!("remote storage healthy again; leaving degraded mode");
                    storage.update_degraded(false);
                }
                delay = backoff.initial;
                sleep(poll_interval).await;
            }
            Err(err) => {
                if storage.is_degraded() {
                    warn!(
                        error = %err,
                        retry_in_ms = delay.as_millis() as u64,
                        "remote storage still unavailable"
                    );
                } else {
                    warn!(
                        error = %err,
                        "remote storage health check failed; entering degraded mode"
                    );
                    storage.update_degraded(true);
                }
                sleep(delay).await;
                delay = (delay * 2).min(backoff.max);
            }
        }
    }
}
