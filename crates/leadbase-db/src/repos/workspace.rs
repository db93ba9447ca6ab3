//! Workspace ownership and membership repository

use async_trait::async_trait;
use leadbase_types::{UserId, WorkspaceId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{DbWorkspaceMembership, WorkspaceMembership, MEMBER_STATUS_ACCEPTED};
use crate::store::WorkspaceDirectory;
use crate::DbResult;

pub struct WorkspaceRepo {
    pool: PgPool,
}

impl WorkspaceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkspaceDirectory for WorkspaceRepo {
    async fn owner_of(&self, workspace_id: WorkspaceId) -> DbResult<Option<UserId>> {
        let owner: Option<Uuid> =
            sqlx::query_scalar("SELECT owner_id FROM workspaces WHERE id = $1")
                .bind(workspace_id.get())
                .fetch_optional(&self.pool)
                .await?;
        Ok(owner.map(UserId))
    }

    async fn is_accepted_member(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
    ) -> DbResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM workspace_members
                WHERE workspace_id = $1 AND user_id = $2 AND status = $3
            )
            "#,
        )
        .bind(workspace_id.get())
        .bind(user_id.0)
        .bind(MEMBER_STATUS_ACCEPTED)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn active_membership(&self, user_id: UserId) -> DbResult<Option<WorkspaceMembership>> {
        let row = sqlx::query_as::<_, DbWorkspaceMembership>(
            r#"
            SELECT wm.workspace_id, w.name AS workspace_name, wm.role, wm.is_active
            FROM workspace_members wm
            JOIN workspaces w ON w.id = wm.workspace_id
            WHERE wm.user_id = $1 AND wm.status = $2 AND wm.is_active = TRUE
            LIMIT 1
            "#,
        )
        .bind(user_id.0)
        .bind(MEMBER_STATUS_ACCEPTED)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn first_accepted_membership(
        &self,
        user_id: UserId,
    ) -> DbResult<Option<WorkspaceMembership>> {
        let row = sqlx::query_as::<_, DbWorkspaceMembership>(
            r#"
            SELECT wm.workspace_id, w.name AS workspace_name, wm.role, wm.is_active
            FROM workspace_members wm
            JOIN workspaces w ON w.id = wm.workspace_id
            WHERE wm.user_id = $1 AND wm.status = $2
            ORDER BY wm.created_at ASC, wm.id ASC
            LIMIT 1
            "#,
        )
        .bind(user_id.0)
        .bind(MEMBER_STATUS_ACCEPTED)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn activate_membership(
        &self,
        user_id: UserId,
        workspace_id: WorkspaceId,
    ) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE workspace_members SET is_active = FALSE, updated_at = NOW() \
             WHERE user_id = $1 AND workspace_id <> $2 AND is_active = TRUE",
        )
        .bind(user_id.0)
        .bind(workspace_id.get())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE workspace_members SET is_active = TRUE, updated_at = NOW() \
             WHERE user_id = $1 AND workspace_id = $2",
        )
        .bind(user_id.0)
        .bind(workspace_id.get())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
