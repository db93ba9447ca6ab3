//! Member activity log repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadbase_types::{
    ActivityLogEntry, ActivityLogFilter, ActivityLogId, ActivityType, ActivityTypeCount,
    MemberActivityCount, NewActivityLog, UserId, WorkspaceId,
};
use sqlx::PgPool;

use crate::models::{DbActivityLog, DbMemberCount, DbTypeCount};
use crate::store::ActivityLogStore;
use crate::DbResult;

pub struct ActivityLogRepo {
    pool: PgPool,
}

impl ActivityLogRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Wrap a search term for `ILIKE ... ESCAPE '\'`, escaping LIKE wildcards.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

const FILTER_WHERE: &str = r#"
    WHERE workspace_id = $1
      AND ($2::uuid IS NULL OR user_id = $2)
      AND ($3::text IS NULL OR activity_type = $3)
      AND ($4::timestamptz IS NULL OR created_at >= $4)
      AND ($5::timestamptz IS NULL OR created_at <= $5)
      AND ($6::text IS NULL
           OR activity_description ILIKE $6 ESCAPE '\'
           OR member_email ILIKE $6 ESCAPE '\'
           OR member_name ILIKE $6 ESCAPE '\')
"#;

#[async_trait]
impl ActivityLogStore for ActivityLogRepo {
    async fn insert(&self, log: &NewActivityLog) -> DbResult<ActivityLogEntry> {
        let metadata = log.metadata.clone().map(|m| m.into_value());
        let row = sqlx::query_as::<_, DbActivityLog>(
            r#"
            INSERT INTO member_activity_logs
                (workspace_id, user_id, member_email, member_name, activity_type,
                 activity_description, metadata, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(log.workspace_id.get())
        .bind(log.user_id.0)
        .bind(&log.member_email)
        .bind(&log.member_name)
        .bind(log.activity_type.as_str())
        .bind(&log.activity_description)
        .bind(metadata)
        .bind(&log.ip_address)
        .bind(&log.user_agent)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn find_by_id(
        &self,
        workspace_id: WorkspaceId,
        id: ActivityLogId,
    ) -> DbResult<Option<ActivityLogEntry>> {
        let row = sqlx::query_as::<_, DbActivityLog>(
            "SELECT * FROM member_activity_logs WHERE workspace_id = $1 AND id = $2",
        )
        .bind(workspace_id.get())
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn find_recent(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
        activity_type: ActivityType,
        since: DateTime<Utc>,
    ) -> DbResult<Option<ActivityLogEntry>> {
        let row = sqlx::query_as::<_, DbActivityLog>(
            r#"
            SELECT * FROM member_activity_logs
            WHERE workspace_id = $1 AND user_id = $2 AND activity_type = $3
              AND created_at >= $4
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(workspace_id.get())
        .bind(user_id.0)
        .bind(activity_type.as_str())
        .bind(since)
        .fetch_optional(&self.pool)
        .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn list(&self, filter: &ActivityLogFilter) -> DbResult<(Vec<ActivityLogEntry>, i64)> {
        let search = filter.search.as_deref().map(like_pattern);
        let activity_type = filter.activity_type.map(ActivityType::as_str);
        let user_id = filter.user_id.map(|u| u.0);

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM member_activity_logs {FILTER_WHERE}"
        ))
        .bind(filter.workspace_id.get())
        .bind(user_id)
        .bind(activity_type)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(search.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, DbActivityLog>(&format!(
            "SELECT * FROM member_activity_logs {FILTER_WHERE} \
             ORDER BY created_at DESC, id DESC LIMIT $7 OFFSET $8"
        ))
        .bind(filter.workspace_id.get())
        .bind(user_id)
        .bind(activity_type)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(search.as_deref())
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await?;

        let entries = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<DbResult<Vec<ActivityLogEntry>>>()?;
        Ok((entries, total))
    }

    async fn count_since(
        &self,
        workspace_id: WorkspaceId,
        since: Option<DateTime<Utc>>,
    ) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM member_activity_logs
            WHERE workspace_id = $1 AND ($2::timestamptz IS NULL OR created_at >= $2)
            "#,
        )
        .bind(workspace_id.get())
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn member_counts_since(
        &self,
        workspace_id: WorkspaceId,
        since: DateTime<Utc>,
        limit: i64,
    ) -> DbResult<Vec<MemberActivityCount>> {
        let rows = sqlx::query_as::<_, DbMemberCount>(
            r#"
            SELECT member_email, MAX(member_name) AS member_name, COUNT(*) AS activity_count
            FROM member_activity_logs
            WHERE workspace_id = $1 AND created_at >= $2
            GROUP BY member_email
            ORDER BY activity_count DESC, member_email ASC
            LIMIT $3
            "#,
        )
        .bind(workspace_id.get())
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn type_counts_since(
        &self,
        workspace_id: WorkspaceId,
        since: DateTime<Utc>,
    ) -> DbResult<Vec<ActivityTypeCount>> {
        let rows = sqlx::query_as::<_, DbTypeCount>(
            r#"
            SELECT activity_type, COUNT(*) AS count
            FROM member_activity_logs
            WHERE workspace_id = $1 AND created_at >= $2
            GROUP BY activity_type
            ORDER BY count DESC, activity_type ASC
            "#,
        )
        .bind(workspace_id.get())
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn health_check(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
