//! Store interfaces consumed by the activity core
//!
//! Both traits are implemented by the PostgreSQL repositories and, behind
//! the `mock` feature, by [`crate::memory::InMemoryStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadbase_types::{
    ActivityLogEntry, ActivityLogFilter, ActivityLogId, ActivityType, ActivityTypeCount,
    MemberActivityCount, NewActivityLog, UserId, WorkspaceId,
};

use crate::error::DbResult;
use crate::models::WorkspaceMembership;

/// Append-only persistence for activity entries.
#[async_trait]
pub trait ActivityLogStore: Send + Sync {
    /// Persist a new entry. `id`, `created_at` and `updated_at` are assigned
    /// by the store.
    async fn insert(&self, log: &NewActivityLog) -> DbResult<ActivityLogEntry>;

    async fn find_by_id(
        &self,
        workspace_id: WorkspaceId,
        id: ActivityLogId,
    ) -> DbResult<Option<ActivityLogEntry>>;

    /// Most recent entry of `activity_type` by `user_id` in `workspace_id`
    /// created at or after `since`.
    async fn find_recent(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
        activity_type: ActivityType,
        since: DateTime<Utc>,
    ) -> DbResult<Option<ActivityLogEntry>>;

    /// One page of matching entries ordered by `created_at DESC, id DESC`,
    /// plus the total number of matches.
    async fn list(&self, filter: &ActivityLogFilter) -> DbResult<(Vec<ActivityLogEntry>, i64)>;

    /// Entries in `workspace_id`, optionally only those created at or after
    /// `since`.
    async fn count_since(
        &self,
        workspace_id: WorkspaceId,
        since: Option<DateTime<Utc>>,
    ) -> DbResult<i64>;

    /// Top members by entry count since `since`, count descending then
    /// email ascending.
    async fn member_counts_since(
        &self,
        workspace_id: WorkspaceId,
        since: DateTime<Utc>,
        limit: i64,
    ) -> DbResult<Vec<MemberActivityCount>>;

    /// Entry count per activity type since `since`, count descending then
    /// type ascending.
    async fn type_counts_since(
        &self,
        workspace_id: WorkspaceId,
        since: DateTime<Utc>,
    ) -> DbResult<Vec<ActivityTypeCount>>;

    async fn health_check(&self) -> DbResult<()>;
}

/// Workspace ownership and membership lookups.
#[async_trait]
pub trait WorkspaceDirectory: Send + Sync {
    async fn owner_of(&self, workspace_id: WorkspaceId) -> DbResult<Option<UserId>>;

    async fn is_accepted_member(&self, workspace_id: WorkspaceId, user_id: UserId)
        -> DbResult<bool>;

    /// The accepted membership currently flagged active for `user_id`.
    async fn active_membership(&self, user_id: UserId) -> DbResult<Option<WorkspaceMembership>>;

    /// The oldest accepted membership of `user_id`.
    async fn first_accepted_membership(
        &self,
        user_id: UserId,
    ) -> DbResult<Option<WorkspaceMembership>>;

    /// Flag `workspace_id` as the active workspace of `user_id`, clearing
    /// the flag on every other membership.
    async fn activate_membership(&self, user_id: UserId, workspace_id: WorkspaceId)
        -> DbResult<()>;
}
