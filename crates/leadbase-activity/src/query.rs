//! Activity Query Service
//!
//! The read path. Every operation runs the Access Guard first and never
//! touches the activity store when access is denied.

use chrono::Local;
use leadbase_db::ActivityLogStore;
use leadbase_types::{
    ActivityLogFilter, ActivityLogPage, ActivityLogStats, ActivityType, ActivityTypeOption, Clock,
    UserId, WorkspaceId,
};
use std::sync::Arc;
use tracing::debug;

use crate::config::ActivityConfig;
use crate::error::ActivityResult;
use crate::guard::AccessGuard;
use crate::stats::StatsWindows;

#[derive(Clone)]
pub struct ActivityQueryService {
    store: Arc<dyn ActivityLogStore>,
    guard: AccessGuard,
    clock: Arc<dyn Clock>,
    config: ActivityConfig,
}

impl ActivityQueryService {
    pub fn new(
        store: Arc<dyn ActivityLogStore>,
        guard: AccessGuard,
        clock: Arc<dyn Clock>,
        config: ActivityConfig,
    ) -> Self {
        Self {
            store,
            guard,
            clock,
            config,
        }
    }

    /// One page of entries matching `filter`, newest first.
    ///
    /// `filter.limit` and `filter.offset` are normalized first: a
    /// non-positive limit becomes the default page size, a larger one is
    /// clamped to the maximum, and a negative offset becomes zero.
    pub async fn list(
        &self,
        caller: UserId,
        mut filter: ActivityLogFilter,
    ) -> ActivityResult<ActivityLogPage> {
        self.guard.require_access(filter.workspace_id, caller).await?;

        let (limit, offset) = self
            .config
            .page_bounds(Some(filter.limit), Some(filter.offset));
        filter.limit = limit;
        filter.offset = offset;
        filter.search = filter.search.filter(|s| !s.trim().is_empty());

        let (data, total) = self.store.list(&filter).await?;
        debug!(
            workspace_id = %filter.workspace_id,
            returned = data.len(),
            total,
            "Listed activity logs"
        );
        Ok(ActivityLogPage::new(data, total, limit, offset))
    }

    /// Aggregate statistics for `workspace_id`.
    pub async fn stats(
        &self,
        caller: UserId,
        workspace_id: WorkspaceId,
    ) -> ActivityResult<ActivityLogStats> {
        self.guard.require_access(workspace_id, caller).await?;

        let windows = StatsWindows::at(self.clock.now(), &Local, self.config.stats_lookback_days);
        let store = self.store.as_ref();

        let (
            total_activities,
            activities_today,
            activities_this_week,
            activities_this_month,
            most_active_members,
            activity_breakdown,
        ) = tokio::try_join!(
            store.count_since(workspace_id, None),
            store.count_since(workspace_id, Some(windows.today)),
            store.count_since(workspace_id, Some(windows.week)),
            store.count_since(workspace_id, Some(windows.month)),
            store.member_counts_since(
                workspace_id,
                windows.lookback,
                self.config.most_active_members
            ),
            store.type_counts_since(workspace_id, windows.lookback),
        )?;

        Ok(ActivityLogStats {
            total_activities,
            activities_today,
            activities_this_week,
            activities_this_month,
            most_active_members,
            activity_breakdown,
        })
    }

    /// The full registry as `{value, label}` pairs.
    pub fn activity_types(&self) -> Vec<ActivityTypeOption> {
        ActivityType::ALL.into_iter().map(Into::into).collect()
    }
}
