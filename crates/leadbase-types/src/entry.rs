//! Activity entry types
//!
//! An [`ActivityLogEntry`] is an immutable fact: created once by the Logger,
//! never updated, never deleted by the application. The member's email and
//! name are snapshotted at log time, so history stays point-in-time even
//! when the member later changes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::activity_type::ActivityType;
use crate::identity::{ActivityLogId, Actor, RequestOrigin, UserId, WorkspaceId};
use crate::metadata::ActivityMetadata;

/// A persisted activity entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub id: ActivityLogId,
    pub workspace_id: WorkspaceId,
    pub user_id: UserId,
    pub member_email: String,
    pub member_name: Option<String>,
    pub activity_type: ActivityType,
    pub activity_description: String,
    pub metadata: Option<ActivityMetadata>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A typed write request, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewActivityLog {
    pub workspace_id: WorkspaceId,
    pub user_id: UserId,
    pub member_email: String,
    pub member_name: Option<String>,
    pub activity_type: ActivityType,
    pub activity_description: String,
    pub metadata: Option<ActivityMetadata>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl NewActivityLog {
    /// Start an entry for `actor` in `workspace_id`.
    pub fn new(
        workspace_id: WorkspaceId,
        actor: &Actor,
        activity_type: ActivityType,
        activity_description: impl Into<String>,
    ) -> Self {
        Self {
            workspace_id,
            user_id: actor.id,
            member_email: actor.email.clone(),
            member_name: actor.name.clone(),
            activity_type,
            activity_description: activity_description.into(),
            metadata: None,
            ip_address: None,
            user_agent: None,
        }
    }

    pub fn with_metadata(mut self, metadata: ActivityMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_origin(mut self, origin: &RequestOrigin) -> Self {
        self.ip_address = origin.ip_address.clone();
        self.user_agent = origin.user_agent.clone();
        self
    }

    /// Blank optional fields become `None`, and an empty metadata object is
    /// dropped.
    pub fn normalized(mut self) -> Self {
        fn blank_to_none(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }
        self.member_name = blank_to_none(self.member_name);
        self.ip_address = blank_to_none(self.ip_address);
        self.user_agent = blank_to_none(self.user_agent);
        self.metadata = self.metadata.filter(|m| !m.is_empty());
        self
    }
}

/// Filter for listing entries of one workspace.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityLogFilter {
    pub workspace_id: WorkspaceId,
    pub user_id: Option<UserId>,
    pub activity_type: Option<ActivityType>,
    /// Inclusive lower bound on `created_at`
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`
    pub end_date: Option<DateTime<Utc>>,
    /// Case-insensitive substring over description, email and name (OR)
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl ActivityLogFilter {
    pub fn for_workspace(workspace_id: WorkspaceId) -> Self {
        Self {
            workspace_id,
            user_id: None,
            activity_type: None,
            start_date: None,
            end_date: None,
            search: None,
            limit: 50,
            offset: 0,
        }
    }

    /// Whether `entry` satisfies every predicate of this filter.
    /// Pagination is not considered.
    pub fn matches(&self, entry: &ActivityLogEntry) -> bool {
        if entry.workspace_id != self.workspace_id {
            return false;
        }
        if self.user_id.is_some_and(|u| u != entry.user_id) {
            return false;
        }
        if self.activity_type.is_some_and(|t| t != entry.activity_type) {
            return false;
        }
        if self.start_date.is_some_and(|start| entry.created_at < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| entry.created_at > end) {
            return false;
        }
        match self.search.as_deref() {
            Some(term) => {
                let term = term.to_lowercase();
                let hit = |s: &str| s.to_lowercase().contains(&term);
                hit(&entry.activity_description)
                    || hit(&entry.member_email)
                    || entry.member_name.as_deref().is_some_and(hit)
            }
            None => true,
        }
    }
}

/// One page of listing results, most recent first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLogPage {
    pub data: Vec<ActivityLogEntry>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}

impl ActivityLogPage {
    pub fn new(data: Vec<ActivityLogEntry>, total: i64, limit: i64, offset: i64) -> Self {
        Self {
            data,
            total,
            limit,
            offset,
            has_more: total > offset.saturating_add(limit),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberActivityCount {
    pub member_email: String,
    pub member_name: Option<String>,
    pub activity_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityTypeCount {
    pub activity_type: ActivityType,
    pub count: i64,
}

/// Aggregate statistics for one workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogStats {
    pub total_activities: i64,
    pub activities_today: i64,
    pub activities_this_week: i64,
    pub activities_this_month: i64,
    /// Top members by count over the lookback window
    pub most_active_members: Vec<MemberActivityCount>,
    /// Count per activity type over the lookback window
    pub activity_breakdown: Vec<ActivityTypeCount>,
}
