//! Application state shared across handlers

use leadbase_activity::{
    AccessGuard, ActivityConfig, ActivityLogger, ActivityQueryService, ActivityRecorder,
};
use leadbase_auth::{AuthService, SessionResolver};
use leadbase_db::{ActivityLogStore, Database, WorkspaceDirectory};
use leadbase_types::{Clock, SystemClock};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Activity log persistence, also probed by readiness
    pub store: Arc<dyn ActivityLogStore>,
    /// Workspace ownership and membership
    pub directory: Arc<dyn WorkspaceDirectory>,
    /// Bearer-token resolution and sign-out
    pub sessions: Arc<dyn SessionResolver>,
    pub guard: AccessGuard,
    pub logger: ActivityLogger,
    /// Fire-and-forget logging for side effects of other endpoints
    pub recorder: Arc<dyn ActivityRecorder>,
    pub query: ActivityQueryService,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ActivityLogStore>,
        directory: Arc<dyn WorkspaceDirectory>,
        sessions: Arc<dyn SessionResolver>,
        clock: Arc<dyn Clock>,
        config: ActivityConfig,
    ) -> Self {
        let guard = AccessGuard::new(directory.clone());
        let logger = ActivityLogger::new(store.clone(), clock.clone(), config.clone());
        let query = ActivityQueryService::new(store.clone(), guard.clone(), clock, config);

        Self {
            store,
            directory,
            sessions,
            guard,
            recorder: Arc::new(logger.clone()),
            logger,
            query,
        }
    }

    /// State backed by PostgreSQL repositories and the system clock.
    pub fn from_database(db: &Database, auth: &AuthService, config: ActivityConfig) -> Self {
        Self::new(
            Arc::new(db.activity_log_repo()),
            Arc::new(db.workspace_repo()),
            auth.resolver(),
            Arc::new(SystemClock),
            config,
        )
    }
}
