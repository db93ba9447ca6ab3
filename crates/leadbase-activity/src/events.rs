//! Typed activity builders
//!
//! One constructor per activity kind emitted by the CRM. Each fixes the
//! canonical description sentence and the metadata keys dashboards read
//! (`old_status`, `new_status`, `webhook_url`, `additional_info.tag_color`,
//! ...). The result goes to [`crate::ActivityRecorder::record`].

use leadbase_types::fields::*;
use leadbase_types::{ActivityMetadata, ActivityType, Actor, NewActivityLog, WorkspaceId};
use serde_json::Value;

/// A lead as seen by activity builders.
#[derive(Debug, Clone)]
pub struct LeadRef<'a> {
    pub id: Value,
    pub name: &'a str,
    pub email: Option<&'a str>,
}

/// A tag as seen by activity builders.
#[derive(Debug, Clone)]
pub struct TagRef<'a> {
    pub id: Value,
    pub name: &'a str,
    pub color: Option<&'a str>,
}

fn entry(
    workspace_id: WorkspaceId,
    actor: &Actor,
    activity_type: ActivityType,
    description: String,
    metadata: ActivityMetadata,
) -> NewActivityLog {
    NewActivityLog::new(workspace_id, actor, activity_type, description).with_metadata(metadata)
}

// ============================================================================
// Authentication
// ============================================================================

pub fn login(workspace_id: WorkspaceId, actor: &Actor) -> NewActivityLog {
    NewActivityLog::new(
        workspace_id,
        actor,
        ActivityType::Login,
        ActivityType::Login.describe(&actor.email, None, None),
    )
}

pub fn logout(
    workspace_id: WorkspaceId,
    actor: &Actor,
    workspace_name: Option<&str>,
) -> NewActivityLog {
    entry(
        workspace_id,
        actor,
        ActivityType::Logout,
        ActivityType::Logout.describe(&actor.email, None, None),
        ActivityMetadata::new().with_opt(WORKSPACE_NAME, workspace_name),
    )
}

// ============================================================================
// Leads
// ============================================================================

pub fn lead_created(workspace_id: WorkspaceId, actor: &Actor, lead: &LeadRef<'_>) -> NewActivityLog {
    let description = match lead.email {
        Some(email) => format!("{} created a new lead: {} ({})", actor.email, lead.name, email),
        None => format!("{} created a new lead: {}", actor.email, lead.name),
    };
    entry(
        workspace_id,
        actor,
        ActivityType::LeadCreated,
        description,
        lead_metadata(lead),
    )
}

pub fn lead_status_changed(
    workspace_id: WorkspaceId,
    actor: &Actor,
    lead: &LeadRef<'_>,
    old_status: &str,
    new_status: &str,
) -> NewActivityLog {
    entry(
        workspace_id,
        actor,
        ActivityType::LeadStatusChanged,
        format!(
            "{} changed lead status for {} from \"{}\" to \"{}\"",
            actor.email, lead.name, old_status, new_status
        ),
        lead_metadata(lead)
            .with(OLD_STATUS, old_status)
            .with(NEW_STATUS, new_status),
    )
}

fn lead_metadata(lead: &LeadRef<'_>) -> ActivityMetadata {
    ActivityMetadata::new()
        .with(LEAD_ID, lead.id.clone())
        .with(LEAD_NAME, lead.name)
        .with_opt(LEAD_EMAIL, lead.email)
        .with(RESOURCE_TYPE, "lead")
        .with(RESOURCE_ID, lead.id.clone())
}

// ============================================================================
// Members and invitations
// ============================================================================

pub fn member_added(
    workspace_id: WorkspaceId,
    actor: &Actor,
    target_email: &str,
    role: &str,
) -> NewActivityLog {
    entry(
        workspace_id,
        actor,
        ActivityType::MemberAdded,
        format!(
            "{} added {} to the workspace with role: {}",
            actor.email, target_email, role
        ),
        ActivityMetadata::new()
            .with(TARGET_MEMBER_EMAIL, target_email)
            .with(NEW_ROLE, role)
            .with(RESOURCE_TYPE, "member"),
    )
}

pub fn member_role_changed(
    workspace_id: WorkspaceId,
    actor: &Actor,
    target_email: &str,
    old_role: &str,
    new_role: &str,
) -> NewActivityLog {
    entry(
        workspace_id,
        actor,
        ActivityType::MemberRoleChanged,
        format!(
            "{} changed {}'s role from \"{}\" to \"{}\"",
            actor.email, target_email, old_role, new_role
        ),
        ActivityMetadata::new()
            .with(TARGET_MEMBER_EMAIL, target_email)
            .with(OLD_ROLE, old_role)
            .with(NEW_ROLE, new_role)
            .with(RESOURCE_TYPE, "member"),
    )
}

pub fn workspace_invite_sent(
    workspace_id: WorkspaceId,
    actor: &Actor,
    invitee_email: &str,
    role: &str,
) -> NewActivityLog {
    entry(
        workspace_id,
        actor,
        ActivityType::WorkspaceInviteSent,
        format!(
            "{} sent a workspace invitation to {} with role: {}",
            actor.email, invitee_email, role
        ),
        ActivityMetadata::new()
            .with(TARGET_MEMBER_EMAIL, invitee_email)
            .with(NEW_ROLE, role)
            .with(RESOURCE_TYPE, "invite"),
    )
}

// ============================================================================
// Webhooks, statuses, tags
// ============================================================================

pub fn webhook_created(
    workspace_id: WorkspaceId,
    actor: &Actor,
    webhook_id: impl Into<Value>,
    name: &str,
    url: &str,
) -> NewActivityLog {
    let webhook_id = webhook_id.into();
    entry(
        workspace_id,
        actor,
        ActivityType::WebhookCreated,
        ActivityType::WebhookCreated.describe(&actor.email, Some(name), None),
        ActivityMetadata::new()
            .with(WEBHOOK_ID, webhook_id.clone())
            .with(WEBHOOK_NAME, name)
            .with(WEBHOOK_URL, url)
            .with(RESOURCE_TYPE, "webhook")
            .with(RESOURCE_ID, webhook_id),
    )
}

pub fn status_created(
    workspace_id: WorkspaceId,
    actor: &Actor,
    status_id: impl Into<Value>,
    name: &str,
    color: Option<&str>,
) -> NewActivityLog {
    let status_id = status_id.into();
    let mut metadata = ActivityMetadata::new()
        .with(STATUS_ID, status_id.clone())
        .with(STATUS_NAME, name)
        .with(RESOURCE_TYPE, "status")
        .with(RESOURCE_ID, status_id);
    if let Some(color) = color {
        metadata = metadata.with_info("color", color);
    }
    entry(
        workspace_id,
        actor,
        ActivityType::StatusCreated,
        ActivityType::StatusCreated.describe(&actor.email, Some(name), None),
        metadata,
    )
}

pub fn tag_created(workspace_id: WorkspaceId, actor: &Actor, tag: &TagRef<'_>) -> NewActivityLog {
    tag_event(workspace_id, actor, tag, ActivityType::TagCreated, "created")
}

pub fn tag_updated(workspace_id: WorkspaceId, actor: &Actor, tag: &TagRef<'_>) -> NewActivityLog {
    tag_event(workspace_id, actor, tag, ActivityType::TagUpdated, "updated")
}

pub fn tag_deleted(workspace_id: WorkspaceId, actor: &Actor, tag: &TagRef<'_>) -> NewActivityLog {
    tag_event(workspace_id, actor, tag, ActivityType::TagDeleted, "deleted")
}

fn tag_event(
    workspace_id: WorkspaceId,
    actor: &Actor,
    tag: &TagRef<'_>,
    activity_type: ActivityType,
    verb: &str,
) -> NewActivityLog {
    let mut metadata = ActivityMetadata::new()
        .with(TAG_ID, tag.id.clone())
        .with(TAG_NAME, tag.name)
        .with(RESOURCE_TYPE, "tag")
        .with(RESOURCE_ID, tag.id.clone());
    if let Some(color) = tag.color {
        metadata = metadata.with_info("tag_color", color);
    }
    entry(
        workspace_id,
        actor,
        activity_type,
        format!("Tag \"{}\" {} by {}", tag.name, verb, actor.email),
        metadata,
    )
}

// ============================================================================
// Workspaces
// ============================================================================

pub fn workspace_created(
    workspace_id: WorkspaceId,
    actor: &Actor,
    name: &str,
    company_type: Option<&str>,
    company_size: Option<&str>,
) -> NewActivityLog {
    let mut metadata = ActivityMetadata::new()
        .with(WORKSPACE_NAME, name)
        .with(RESOURCE_TYPE, "workspace")
        .with(RESOURCE_ID, workspace_id.get());
    if let Some(company_type) = company_type {
        metadata = metadata.with_info("company_type", company_type);
    }
    if let Some(company_size) = company_size {
        metadata = metadata.with_info("company_size", company_size);
    }
    entry(
        workspace_id,
        actor,
        ActivityType::WorkspaceCreated,
        format!("Workspace \"{}\" created by {}", name, actor.email),
        metadata,
    )
}

pub fn workspace_updated(
    workspace_id: WorkspaceId,
    actor: &Actor,
    name: &str,
    changes: Value,
) -> NewActivityLog {
    entry(
        workspace_id,
        actor,
        ActivityType::WorkspaceUpdated,
        format!("Workspace settings updated by {}", actor.email),
        ActivityMetadata::new()
            .with(WORKSPACE_NAME, name)
            .with(CHANGES, changes),
    )
}

/// First activation of a workspace for a member with no active workspace.
pub fn workspace_activated(
    workspace_id: WorkspaceId,
    actor: &Actor,
    name: &str,
    member_role: &str,
) -> NewActivityLog {
    entry(
        workspace_id,
        actor,
        ActivityType::WorkspaceJoin,
        format!("{} activated their first workspace: {}", actor.email, name),
        ActivityMetadata::new()
            .with(WORKSPACE_NAME, name)
            .with_info("activation_type", "first_workspace")
            .with_info("member_role", member_role),
    )
}

pub fn workspace_switched(workspace_id: WorkspaceId, actor: &Actor, name: &str) -> NewActivityLog {
    entry(
        workspace_id,
        actor,
        ActivityType::WorkspaceJoin,
        format!("{} switched to workspace: {}", actor.email, name),
        ActivityMetadata::new()
            .with(WORKSPACE_NAME, name)
            .with_info("activation_type", "switch"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadbase_types::UserId;
    use serde_json::json;

    fn actor() -> Actor {
        Actor::new(UserId::new(), "a@b.com")
    }

    fn all_builders() -> Vec<NewActivityLog> {
        let ws = WorkspaceId(9);
        let a = actor();
        let lead = LeadRef {
            id: json!(12),
            name: "Jane Doe",
            email: Some("jane@acme.io"),
        };
        let tag = TagRef {
            id: json!(3),
            name: "VIP",
            color: Some("#ff0000"),
        };
        vec![
            login(ws, &a),
            logout(ws, &a, Some("Acme")),
            lead_created(ws, &a, &lead),
            lead_status_changed(ws, &a, &lead, "New", "Won"),
            member_added(ws, &a, "b@b.com", "member"),
            member_role_changed(ws, &a, "b@b.com", "member", "admin"),
            workspace_invite_sent(ws, &a, "c@b.com", "member"),
            webhook_created(ws, &a, 5, "Zapier", "https://hooks.example.com/x"),
            status_created(ws, &a, 4, "Qualified", Some("#00ff00")),
            tag_created(ws, &a, &tag),
            tag_updated(ws, &a, &tag),
            tag_deleted(ws, &a, &tag),
            workspace_created(ws, &a, "Acme", Some("agency"), Some("11-50")),
            workspace_updated(ws, &a, "Acme", json!({"name": "Acme"})),
            workspace_activated(ws, &a, "Acme", "admin"),
            workspace_switched(ws, &a, "Acme"),
        ]
    }

    #[test]
    fn test_builders_stay_inside_metadata_allow_list() {
        for log in all_builders() {
            if let Some(metadata) = &log.metadata {
                assert!(
                    metadata.validate_for(log.activity_type).is_ok(),
                    "{} carries {:?}",
                    log.activity_type,
                    metadata.unknown_fields(log.activity_type)
                );
            }
        }
    }

    #[test]
    fn test_tag_description_and_color() {
        let tag = TagRef {
            id: json!(3),
            name: "VIP",
            color: Some("#ff0000"),
        };
        let log = tag_created(WorkspaceId(1), &actor(), &tag);
        assert_eq!(log.activity_description, "Tag \"VIP\" created by a@b.com");
        assert_eq!(
            log.metadata.unwrap().into_value(),
            json!({
                "tag_id": 3,
                "tag_name": "VIP",
                "resource_type": "tag",
                "resource_id": 3,
                "additional_info": {"tag_color": "#ff0000"}
            })
        );
    }

    #[test]
    fn test_lead_status_change() {
        let lead = LeadRef {
            id: json!("L-1"),
            name: "Jane",
            email: None,
        };
        let log = lead_status_changed(WorkspaceId(1), &actor(), &lead, "New", "Won");
        assert_eq!(
            log.activity_description,
            "a@b.com changed lead status for Jane from \"New\" to \"Won\""
        );
        let metadata = log.metadata.unwrap();
        assert_eq!(metadata.get_str(OLD_STATUS), Some("New"));
        assert_eq!(metadata.get_str(NEW_STATUS), Some("Won"));
        assert!(metadata.get(LEAD_EMAIL).is_none());
    }

    #[test]
    fn test_logout_without_workspace_name_has_empty_metadata() {
        let log = logout(WorkspaceId(1), &actor(), None).normalized();
        assert_eq!(log.activity_description, "a@b.com logged out of the workspace");
        assert!(log.metadata.is_none());
    }

    #[test]
    fn test_first_activation() {
        let log = workspace_activated(WorkspaceId(1), &actor(), "Acme", "owner");
        assert_eq!(log.activity_type, ActivityType::WorkspaceJoin);
        assert_eq!(
            log.metadata.unwrap().get(ADDITIONAL_INFO),
            Some(&json!({"activation_type": "first_workspace", "member_role": "owner"}))
        );
    }
}
