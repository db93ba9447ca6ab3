//! Database models - mapped from PostgreSQL tables

use chrono::{DateTime, Utc};
use leadbase_types::{
    ActivityLogEntry, ActivityLogId, ActivityMetadata, ActivityType, ActivityTypeCount,
    MemberActivityCount, UserId, WorkspaceId,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::DbError;

// ============================================================================
// Activity Log Models
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbActivityLog {
    pub id: Uuid,
    pub workspace_id: i64,
    pub user_id: Uuid,
    pub member_email: String,
    pub member_name: Option<String>,
    pub activity_type: String,
    pub activity_description: String,
    pub metadata: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbActivityLog> for ActivityLogEntry {
    type Error = DbError;

    fn try_from(row: DbActivityLog) -> Result<Self, Self::Error> {
        let activity_type = row
            .activity_type
            .parse::<ActivityType>()
            .map_err(|e| DbError::Corrupt(format!("activity log {}: {}", row.id, e)))?;
        let metadata = row
            .metadata
            .filter(|v| !v.is_null())
            .map(ActivityMetadata::try_from)
            .transpose()
            .map_err(|e| DbError::Corrupt(format!("activity log {}: {}", row.id, e)))?;

        Ok(ActivityLogEntry {
            id: ActivityLogId(row.id),
            workspace_id: WorkspaceId(row.workspace_id),
            user_id: UserId(row.user_id),
            member_email: row.member_email,
            member_name: row.member_name,
            activity_type,
            activity_description: row.activity_description,
            metadata,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbMemberCount {
    pub member_email: String,
    pub member_name: Option<String>,
    pub activity_count: i64,
}

impl From<DbMemberCount> for MemberActivityCount {
    fn from(row: DbMemberCount) -> Self {
        Self {
            member_email: row.member_email,
            member_name: row.member_name,
            activity_count: row.activity_count,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbTypeCount {
    pub activity_type: String,
    pub count: i64,
}

impl TryFrom<DbTypeCount> for ActivityTypeCount {
    type Error = DbError;

    fn try_from(row: DbTypeCount) -> Result<Self, Self::Error> {
        let activity_type = row
            .activity_type
            .parse::<ActivityType>()
            .map_err(|e| DbError::Corrupt(e.to_string()))?;
        Ok(Self {
            activity_type,
            count: row.count,
        })
    }
}

// ============================================================================
// Workspace Models
// ============================================================================

/// Membership status value granting access to a workspace
pub const MEMBER_STATUS_ACCEPTED: &str = "accepted";

#[derive(Debug, Clone, FromRow)]
pub struct DbWorkspaceMembership {
    pub workspace_id: i64,
    pub workspace_name: String,
    pub role: String,
    pub is_active: bool,
}

/// A user's accepted membership in a workspace, joined with the
/// workspace name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceMembership {
    pub workspace_id: WorkspaceId,
    pub workspace_name: String,
    pub role: String,
    pub is_active: bool,
}

impl From<DbWorkspaceMembership> for WorkspaceMembership {
    fn from(row: DbWorkspaceMembership) -> Self {
        Self {
            workspace_id: WorkspaceId(row.workspace_id),
            workspace_name: row.workspace_name,
            role: row.role,
            is_active: row.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(activity_type: &str, metadata: Option<serde_json::Value>) -> DbActivityLog {
        let now = Utc::now();
        DbActivityLog {
            id: Uuid::new_v4(),
            workspace_id: 7,
            user_id: Uuid::new_v4(),
            member_email: "a@b.com".into(),
            member_name: None,
            activity_type: activity_type.into(),
            activity_description: "a@b.com logged into the workspace".into(),
            metadata,
            ip_address: None,
            user_agent: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_row_maps_to_entry() {
        let entry = ActivityLogEntry::try_from(row("login", Some(json!({"workspace_name": "Acme"}))))
            .unwrap();
        assert_eq!(entry.activity_type, ActivityType::Login);
        assert_eq!(entry.workspace_id, WorkspaceId(7));
        assert_eq!(
            entry.metadata.unwrap().get_str("workspace_name"),
            Some("Acme")
        );
    }

    #[test]
    fn test_json_null_metadata_is_absent() {
        let entry = ActivityLogEntry::try_from(row("logout", Some(serde_json::Value::Null))).unwrap();
        assert!(entry.metadata.is_none());
    }

    #[test]
    fn test_unknown_type_is_corrupt() {
        let err = ActivityLogEntry::try_from(row("teleported", None)).unwrap_err();
        assert!(matches!(err, DbError::Corrupt(_)));
    }
}
