//! Workspace DTOs

use leadbase_db::WorkspaceMembership;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const NO_WORKSPACES: &str = "No workspaces found";

/// The caller's active workspace and their role in it
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActiveWorkspace {
    pub id: i64,
    pub name: String,
    pub role: String,
    pub is_active: bool,
}

impl From<WorkspaceMembership> for ActiveWorkspace {
    fn from(m: WorkspaceMembership) -> Self {
        Self {
            id: m.workspace_id.get(),
            name: m.workspace_name,
            role: m.role,
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActiveWorkspaceResponse {
    pub data: ActiveWorkspace,
}
