//! ActivityType registry
//!
//! The closed set of activity kinds a member can produce, with their wire
//! value, display label and default description sentence. The Logger rejects
//! anything outside this set, so consumers can enumerate every kind that can
//! ever appear in the audit trail.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;

/// Kind of member activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    // Authentication
    Login,
    Logout,
    PasswordChange,

    // Workspace
    WorkspaceJoin,
    WorkspaceLeave,
    WorkspaceInviteSent,
    WorkspaceInviteAccepted,
    WorkspaceInviteDeclined,
    WorkspaceCreated,
    WorkspaceUpdated,

    // Lead management
    LeadCreated,
    LeadUpdated,
    LeadDeleted,
    LeadStatusChanged,
    LeadAssigned,
    LeadUnassigned,

    // Status management
    StatusCreated,
    StatusUpdated,
    StatusDeleted,

    // Tag management
    TagCreated,
    TagUpdated,
    TagDeleted,

    // Webhooks
    WebhookCreated,
    WebhookUpdated,
    WebhookDeleted,

    // Member management
    MemberAdded,
    MemberRemoved,
    MemberRoleChanged,

    // General
    ProfileUpdated,
    SettingsChanged,
    DataExport,
    DataImport,
}

impl ActivityType {
    /// Every registered kind, in declaration order.
    pub const ALL: [ActivityType; 32] = [
        Self::Login,
        Self::Logout,
        Self::PasswordChange,
        Self::WorkspaceJoin,
        Self::WorkspaceLeave,
        Self::WorkspaceInviteSent,
        Self::WorkspaceInviteAccepted,
        Self::WorkspaceInviteDeclined,
        Self::WorkspaceCreated,
        Self::WorkspaceUpdated,
        Self::LeadCreated,
        Self::LeadUpdated,
        Self::LeadDeleted,
        Self::LeadStatusChanged,
        Self::LeadAssigned,
        Self::LeadUnassigned,
        Self::StatusCreated,
        Self::StatusUpdated,
        Self::StatusDeleted,
        Self::TagCreated,
        Self::TagUpdated,
        Self::TagDeleted,
        Self::WebhookCreated,
        Self::WebhookUpdated,
        Self::WebhookDeleted,
        Self::MemberAdded,
        Self::MemberRemoved,
        Self::MemberRoleChanged,
        Self::ProfileUpdated,
        Self::SettingsChanged,
        Self::DataExport,
        Self::DataImport,
    ];

    /// Wire value, as stored in `member_activity_logs.activity_type`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Logout => "logout",
            Self::PasswordChange => "password_change",
            Self::WorkspaceJoin => "workspace_join",
            Self::WorkspaceLeave => "workspace_leave",
            Self::WorkspaceInviteSent => "workspace_invite_sent",
            Self::WorkspaceInviteAccepted => "workspace_invite_accepted",
            Self::WorkspaceInviteDeclined => "workspace_invite_declined",
            Self::WorkspaceCreated => "workspace_created",
            Self::WorkspaceUpdated => "workspace_updated",
            Self::LeadCreated => "lead_created",
            Self::LeadUpdated => "lead_updated",
            Self::LeadDeleted => "lead_deleted",
            Self::LeadStatusChanged => "lead_status_changed",
            Self::LeadAssigned => "lead_assigned",
            Self::LeadUnassigned => "lead_unassigned",
            Self::StatusCreated => "status_created",
            Self::StatusUpdated => "status_updated",
            Self::StatusDeleted => "status_deleted",
            Self::TagCreated => "tag_created",
            Self::TagUpdated => "tag_updated",
            Self::TagDeleted => "tag_deleted",
            Self::WebhookCreated => "webhook_created",
            Self::WebhookUpdated => "webhook_updated",
            Self::WebhookDeleted => "webhook_deleted",
            Self::MemberAdded => "member_added",
            Self::MemberRemoved => "member_removed",
            Self::MemberRoleChanged => "member_role_changed",
            Self::ProfileUpdated => "profile_updated",
            Self::SettingsChanged => "settings_changed",
            Self::DataExport => "data_export",
            Self::DataImport => "data_import",
        }
    }

    /// Human-readable label used by dashboards and filter dropdowns.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Logout => "Logout",
            Self::PasswordChange => "Password Change",
            Self::WorkspaceJoin => "Workspace Join",
            Self::WorkspaceLeave => "Workspace Leave",
            Self::WorkspaceInviteSent => "Invite Sent",
            Self::WorkspaceInviteAccepted => "Invite Accepted",
            Self::WorkspaceInviteDeclined => "Invite Declined",
            Self::WorkspaceCreated => "Workspace Created",
            Self::WorkspaceUpdated => "Workspace Updated",
            Self::LeadCreated => "Lead Created",
            Self::LeadUpdated => "Lead Updated",
            Self::LeadDeleted => "Lead Deleted",
            Self::LeadStatusChanged => "Lead Status Changed",
            Self::LeadAssigned => "Lead Assigned",
            Self::LeadUnassigned => "Lead Unassigned",
            Self::StatusCreated => "Status Created",
            Self::StatusUpdated => "Status Updated",
            Self::StatusDeleted => "Status Deleted",
            Self::TagCreated => "Tag Created",
            Self::TagUpdated => "Tag Updated",
            Self::TagDeleted => "Tag Deleted",
            Self::WebhookCreated => "Webhook Created",
            Self::WebhookUpdated => "Webhook Updated",
            Self::WebhookDeleted => "Webhook Deleted",
            Self::MemberAdded => "Member Added",
            Self::MemberRemoved => "Member Removed",
            Self::MemberRoleChanged => "Role Changed",
            Self::ProfileUpdated => "Profile Updated",
            Self::SettingsChanged => "Settings Changed",
            Self::DataExport => "Data Export",
            Self::DataImport => "Data Import",
        }
    }

    /// Only LOGIN is subject to cooling-period suppression.
    pub fn has_cooling_period(self) -> bool {
        matches!(self, Self::Login)
    }

    /// Default description sentence for this kind.
    ///
    /// `resource_name` is woven into the sentence for resource kinds (leads,
    /// statuses, tags, webhooks); `additional_info` is appended as
    /// ` - <info>`.
    pub fn describe(
        self,
        member_email: &str,
        resource_name: Option<&str>,
        additional_info: Option<&str>,
    ) -> String {
        let named = |prefix: &str| match resource_name {
            Some(name) => format!("{member_email} {prefix}: {name}"),
            None => format!("{member_email} {prefix}"),
        };

        let mut description = match self {
            Self::Login => format!("{member_email} logged into the workspace"),
            Self::Logout => format!("{member_email} logged out of the workspace"),
            Self::PasswordChange => format!("{member_email} changed their password"),
            Self::WorkspaceJoin => format!("{member_email} joined the workspace"),
            Self::WorkspaceLeave => format!("{member_email} left the workspace"),
            Self::WorkspaceInviteSent => format!("{member_email} sent a workspace invitation"),
            Self::WorkspaceInviteAccepted => {
                format!("{member_email} accepted a workspace invitation")
            }
            Self::WorkspaceInviteDeclined => {
                format!("{member_email} declined a workspace invitation")
            }
            Self::WorkspaceCreated => named("created a new workspace"),
            Self::WorkspaceUpdated => format!("{member_email} updated workspace settings"),
            Self::LeadCreated => named("created a new lead"),
            Self::LeadUpdated => named("updated a lead"),
            Self::LeadDeleted => named("deleted a lead"),
            Self::LeadStatusChanged => match resource_name {
                Some(name) => format!("{member_email} changed lead status for {name}"),
                None => format!("{member_email} changed lead status"),
            },
            Self::LeadAssigned => named("assigned a lead"),
            Self::LeadUnassigned => named("unassigned a lead"),
            Self::StatusCreated => named("created a new status"),
            Self::StatusUpdated => named("updated a status"),
            Self::StatusDeleted => named("deleted a status"),
            Self::TagCreated => named("created a new tag"),
            Self::TagUpdated => named("updated a tag"),
            Self::TagDeleted => named("deleted a tag"),
            Self::WebhookCreated => named("created a new webhook"),
            Self::WebhookUpdated => named("updated a webhook"),
            Self::WebhookDeleted => named("deleted a webhook"),
            Self::MemberAdded => format!("{member_email} added a new member to the workspace"),
            Self::MemberRemoved => format!("{member_email} removed a member from the workspace"),
            Self::MemberRoleChanged => format!("{member_email} changed a member's role"),
            Self::ProfileUpdated => format!("{member_email} updated their profile"),
            Self::SettingsChanged => format!("{member_email} changed workspace settings"),
            Self::DataExport => format!("{member_email} exported workspace data"),
            Self::DataImport => format!("{member_email} imported data into the workspace"),
        };

        if let Some(info) = additional_info {
            description.push_str(" - ");
            description.push_str(info);
        }

        description
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| TypesError::UnknownActivityType(s.to_string()))
    }
}

/// `{value, label}` pair served by the activity types endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityTypeOption {
    pub value: ActivityType,
    pub label: String,
}

impl From<ActivityType> for ActivityTypeOption {
    fn from(value: ActivityType) -> Self {
        Self {
            value,
            label: value.display_name().to_string(),
        }
    }
}
