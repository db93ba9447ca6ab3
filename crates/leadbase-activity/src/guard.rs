//! Access Guard
//!
//! Owner-or-accepted-member check scoped to a workspace. Lookup failures
//! deny access: audit data is only readable when membership is proven.

use leadbase_db::WorkspaceDirectory;
use leadbase_types::{UserId, WorkspaceId};
use std::sync::Arc;
use tracing::error;

use crate::error::{ActivityError, ActivityResult};

#[derive(Clone)]
pub struct AccessGuard {
    directory: Arc<dyn WorkspaceDirectory>,
}

impl AccessGuard {
    pub fn new(directory: Arc<dyn WorkspaceDirectory>) -> Self {
        Self { directory }
    }

    /// Whether `user_id` may read or write activity data of `workspace_id`.
    pub async fn has_access(&self, workspace_id: WorkspaceId, user_id: UserId) -> bool {
        match self.directory.owner_of(workspace_id).await {
            Ok(Some(owner)) if owner == user_id => return true,
            Ok(_) => {}
            Err(e) => {
                error!(workspace_id = %workspace_id, user_id = %user_id, error = %e, "Workspace owner lookup failed");
                return false;
            }
        }

        match self.directory.is_accepted_member(workspace_id, user_id).await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!(workspace_id = %workspace_id, user_id = %user_id, error = %e, "Workspace membership lookup failed");
                false
            }
        }
    }

    /// [`has_access`](Self::has_access) as a `Result`.
    pub async fn require_access(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
    ) -> ActivityResult<()> {
        if self.has_access(workspace_id, user_id).await {
            Ok(())
        } else {
            Err(ActivityError::AccessDenied)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadbase_db::{InMemoryStore, MEMBER_STATUS_ACCEPTED};

    fn setup() -> (Arc<InMemoryStore>, AccessGuard, UserId) {
        let store = Arc::new(InMemoryStore::default());
        let owner = UserId::new();
        store.add_workspace(WorkspaceId(1), "Acme", owner);
        let guard = AccessGuard::new(store.clone());
        (store, guard, owner)
    }

    #[tokio::test]
    async fn test_owner_has_access() {
        let (_, guard, owner) = setup();
        assert!(guard.has_access(WorkspaceId(1), owner).await);
    }

    #[tokio::test]
    async fn test_accepted_member_has_access_pending_does_not() {
        let (store, guard, _) = setup();
        let accepted = UserId::new();
        let pending = UserId::new();
        store.add_member(WorkspaceId(1), accepted, "member", MEMBER_STATUS_ACCEPTED);
        store.add_member(WorkspaceId(1), pending, "member", "pending");

        assert!(guard.has_access(WorkspaceId(1), accepted).await);
        assert!(!guard.has_access(WorkspaceId(1), pending).await);
    }

    #[tokio::test]
    async fn test_stranger_denied() {
        let (_, guard, _) = setup();
        assert!(matches!(
            guard.require_access(WorkspaceId(1), UserId::new()).await,
            Err(ActivityError::AccessDenied)
        ));
    }

    #[tokio::test]
    async fn test_lookup_failure_fails_closed() {
        let (store, guard, owner) = setup();
        store.fail_directory(true);
        assert!(!guard.has_access(WorkspaceId(1), owner).await);
    }
}
