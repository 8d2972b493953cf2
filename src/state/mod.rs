/// Simulation-mode sessions and their event feed.
pub mod session;

use std::sync::Arc;

use crate::{
    config::AppConfig,
    dao::arena_store::ArenaStorage,
    services::feedback::{FallbackJudge, FeedbackJudge},
};

pub use self::session::{Session, SessionEvent, SessionHub};

/// Shared handle on the application state.
pub type SharedState = Arc<AppState>;

const SESSION_EVENTS_CAPACITY: usize = 16;

/// Central application state: configuration, storage facade, sessions and collaborators.
pub struct AppState {
    config: AppConfig,
    storage: ArenaStorage,
    sessions: SessionHub,
    judge: Arc<dyn FeedbackJudge>,
}

impl AppState {
    /// Build the state from `config`, selecting the storage backend once.
    pub fn new(config: AppConfig) -> SharedState {
        let storage = ArenaStorage::select(&config);
        Self::with_parts(config, storage, Arc::new(FallbackJudge))
    }

    /// Assemble the state from already-built parts.
    pub fn with_parts(
        config: AppConfig,
        storage: ArenaStorage,
        judge: Arc<dyn FeedbackJudge>,
    ) -> SharedState {
        Arc::new(Self {
            config,
            storage,
            sessions: SessionHub::new(SESSION_EVENTS_CAPACITY),
            judge,
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Persistence facade shared by every service.
    pub fn storage(&self) -> &ArenaStorage {
        &self.storage
    }

    /// Open sessions and their event feed.
    pub fn sessions(&self) -> &SessionHub {
        &self.sessions
    }

    /// Feedback collaborator.
    pub fn judge(&self) -> &dyn FeedbackJudge {
        self.judge.as_ref()
    }
}
