//! Activity log DTOs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use leadbase_activity::LogActivityRequest;
use leadbase_types::{
    ActivityLogEntry, ActivityLogFilter, ActivityLogPage, ActivityLogStats, ActivityType,
    ActivityTypeCount, ActivityTypeOption, MemberActivityCount, RequestOrigin, UserId,
    WorkspaceId,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

pub const MISSING_CREATE_FIELDS: &str = "Missing required fields: workspace_id, activity_type, activity_description, and member_email are required";
pub const WORKSPACE_ID_REQUIRED: &str = "workspace_id is required";
pub const INVALID_WORKSPACE_ID: &str = "Invalid workspace_id format";
pub const INVALID_ACTIVITY_TYPE: &str = "Invalid activity type";
pub const LOGGED_SUCCESSFULLY: &str = "Activity logged successfully";

// =============================================================================
// Requests
// =============================================================================

/// Body of `createActivityLog`. The acting user comes from the bearer
/// token, never from the body.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateActivityLogRequest {
    /// Numeric workspace id, as a number or a numeric string
    #[schema(value_type = Object)]
    pub workspace_id: Option<Value>,
    #[schema(example = "tag_created")]
    pub activity_type: Option<String>,
    pub activity_description: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
    pub member_email: Option<String>,
    pub member_name: Option<String>,
}

impl CreateActivityLogRequest {
    /// Validate the body and build the Logger request for `user_id`.
    pub fn into_log_request(
        self,
        user_id: UserId,
        origin: RequestOrigin,
    ) -> ApiResult<(WorkspaceId, LogActivityRequest)> {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        let workspace_given = match &self.workspace_id {
            None | Some(Value::Null) | Some(Value::Bool(false)) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Number(n)) => n.as_f64() != Some(0.0),
            Some(_) => true,
        };
        if !workspace_given
            || !present(&self.activity_type)
            || !present(&self.activity_description)
            || !present(&self.member_email)
        {
            return Err(ApiError::BadRequest(MISSING_CREATE_FIELDS.to_string()));
        }

        let workspace_id = self
            .workspace_id
            .as_ref()
            .and_then(workspace_id_from_json)
            .ok_or_else(|| ApiError::BadRequest(INVALID_WORKSPACE_ID.to_string()))?;

        let activity_type = parse_activity_type(self.activity_type.as_deref().unwrap_or_default())?;

        Ok((
            workspace_id,
            LogActivityRequest {
                workspace_id: Some(workspace_id),
                user_id: Some(user_id),
                member_email: self.member_email,
                member_name: self.member_name,
                activity_type: Some(activity_type.to_string()),
                activity_description: self.activity_description,
                metadata: self.metadata,
                ip_address: origin.ip_address,
                user_agent: origin.user_agent,
            },
        ))
    }
}

fn workspace_id_from_json(value: &Value) -> Option<WorkspaceId> {
    match value {
        Value::Number(n) => n.as_i64().map(WorkspaceId),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_activity_type(value: &str) -> ApiResult<ActivityType> {
    value
        .trim()
        .parse()
        .map_err(|_: leadbase_types::TypesError| {
            ApiError::BadRequest(INVALID_ACTIVITY_TYPE.to_string())
        })
}

/// Query of the activity log endpoint. Every field is optional at this
/// level; each action checks what it needs.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActivityLogsParams {
    /// `createActivityLog`, `getActivityLogs`, `getActivityLogStats` or
    /// `getActivityTypes`
    pub action: Option<String>,
    pub workspace_id: Option<String>,
    /// Only entries of this member
    pub user_id: Option<String>,
    pub activity_type: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`, inclusive
    pub start_date: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`, inclusive
    pub end_date: Option<String>,
    /// Page size, default 50, at most 100
    pub limit: Option<String>,
    pub offset: Option<String>,
    /// Case-insensitive match on description, email or name
    pub search: Option<String>,
}

impl ActivityLogsParams {
    pub fn action(&self) -> &str {
        self.action.as_deref().unwrap_or_default()
    }

    pub fn workspace_id(&self) -> ApiResult<WorkspaceId> {
        let raw = non_blank(&self.workspace_id)
            .ok_or_else(|| ApiError::BadRequest(WORKSPACE_ID_REQUIRED.to_string()))?;
        raw.parse()
            .map_err(|_| ApiError::BadRequest(INVALID_WORKSPACE_ID.to_string()))
    }

    /// Listing filter. Page bounds are passed through raw; unparsable values
    /// become 0 and are normalized by the query service.
    pub fn to_filter(&self) -> ApiResult<ActivityLogFilter> {
        let mut filter = ActivityLogFilter::for_workspace(self.workspace_id()?);

        filter.user_id = non_blank(&self.user_id)
            .map(|raw| {
                UserId::parse(raw)
                    .map_err(|_| ApiError::BadRequest("Invalid user_id format".to_string()))
            })
            .transpose()?;
        filter.activity_type = non_blank(&self.activity_type)
            .map(parse_activity_type)
            .transpose()?;
        filter.start_date = non_blank(&self.start_date).map(parse_date).transpose()?;
        filter.end_date = non_blank(&self.end_date).map(parse_date).transpose()?;
        filter.search = non_blank(&self.search).map(str::to_string);
        filter.limit = parse_or_zero(&self.limit);
        filter.offset = parse_or_zero(&self.offset);
        Ok(filter)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_or_zero(value: &Option<String>) -> i64 {
    non_blank(value).and_then(|s| s.parse().ok()).unwrap_or(0)
}

/// RFC 3339, or a plain date taken as UTC midnight.
fn parse_date(value: &str) -> ApiResult<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| ApiError::BadRequest(format!("Invalid date: {value}")))
}

// =============================================================================
// Responses
// =============================================================================

/// A stored activity entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityLogDto {
    pub id: Uuid,
    pub workspace_id: i64,
    pub user_id: Uuid,
    pub member_email: String,
    pub member_name: Option<String>,
    #[schema(example = "lead_status_changed")]
    pub activity_type: String,
    pub activity_description: String,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ActivityLogEntry> for ActivityLogDto {
    fn from(e: ActivityLogEntry) -> Self {
        Self {
            id: *e.id.as_uuid(),
            workspace_id: e.workspace_id.get(),
            user_id: *e.user_id.as_uuid(),
            member_email: e.member_email,
            member_name: e.member_name,
            activity_type: e.activity_type.to_string(),
            activity_description: e.activity_description,
            metadata: e.metadata.map(|m| m.into_value()),
            ip_address: e.ip_address,
            user_agent: e.user_agent,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

/// `201` body of `createActivityLog`. `data` is absent when a LOGIN was
/// skipped by the cooling period.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateActivityLogResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ActivityLogDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityLogPageResponse {
    pub data: Vec<ActivityLogDto>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}

impl From<ActivityLogPage> for ActivityLogPageResponse {
    fn from(page: ActivityLogPage) -> Self {
        Self {
            data: page.data.into_iter().map(Into::into).collect(),
            total: page.total,
            limit: page.limit,
            offset: page.offset,
            has_more: page.has_more,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemberActivityDto {
    pub member_email: String,
    pub member_name: Option<String>,
    pub activity_count: i64,
}

impl From<MemberActivityCount> for MemberActivityDto {
    fn from(m: MemberActivityCount) -> Self {
        Self {
            member_email: m.member_email,
            member_name: m.member_name,
            activity_count: m.activity_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityTypeCountDto {
    pub activity_type: String,
    pub count: i64,
}

impl From<ActivityTypeCount> for ActivityTypeCountDto {
    fn from(c: ActivityTypeCount) -> Self {
        Self {
            activity_type: c.activity_type.to_string(),
            count: c.count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityLogStatsResponse {
    pub total_activities: i64,
    pub activities_today: i64,
    pub activities_this_week: i64,
    pub activities_this_month: i64,
    /// Top members over the last 30 days
    pub most_active_members: Vec<MemberActivityDto>,
    /// Count per type over the last 30 days
    pub activity_breakdown: Vec<ActivityTypeCountDto>,
}

impl From<ActivityLogStats> for ActivityLogStatsResponse {
    fn from(s: ActivityLogStats) -> Self {
        Self {
            total_activities: s.total_activities,
            activities_today: s.activities_today,
            activities_this_week: s.activities_this_week,
            activities_this_month: s.activities_this_month,
            most_active_members: s.most_active_members.into_iter().map(Into::into).collect(),
            activity_breakdown: s.activity_breakdown.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityTypeOptionDto {
    #[schema(example = "lead_created")]
    pub value: String,
    #[schema(example = "Lead Created")]
    pub label: String,
}

impl From<ActivityTypeOption> for ActivityTypeOptionDto {
    fn from(o: ActivityTypeOption) -> Self {
        Self {
            value: o.value.to_string(),
            label: o.label,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityTypesResponse {
    pub data: Vec<ActivityTypeOptionDto>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> CreateActivityLogRequest {
        serde_json::from_value(value).unwrap()
    }

    fn valid() -> Value {
        json!({
            "workspace_id": "42",
            "activity_type": "tag_created",
            "activity_description": "Tag \"VIP\" created by a@b.com",
            "member_email": "a@b.com"
        })
    }

    #[test]
    fn test_create_accepts_numeric_string_or_number() {
        let user = UserId::new();
        let (ws, req) = body(valid())
            .into_log_request(user, RequestOrigin::default())
            .unwrap();
        assert_eq!(ws, WorkspaceId(42));
        assert_eq!(req.user_id, Some(user));

        let mut numeric = valid();
        numeric["workspace_id"] = json!(42);
        assert!(body(numeric)
            .into_log_request(user, RequestOrigin::default())
            .is_ok());
    }

    #[test]
    fn test_create_missing_fields() {
        for field in ["workspace_id", "activity_type", "activity_description", "member_email"] {
            let mut value = valid();
            value[field] = json!("");
            let err = body(value)
                .into_log_request(UserId::new(), RequestOrigin::default())
                .unwrap_err();
            assert_eq!(err.to_string(), MISSING_CREATE_FIELDS, "{field}");
        }
    }

    #[test]
    fn test_create_invalid_workspace_and_type() {
        let mut value = valid();
        value["workspace_id"] = json!("abc");
        let err = body(value)
            .into_log_request(UserId::new(), RequestOrigin::default())
            .unwrap_err();
        assert_eq!(err.to_string(), INVALID_WORKSPACE_ID);

        let mut value = valid();
        value["activity_type"] = json!("not_a_real_type");
        let err = body(value)
            .into_log_request(UserId::new(), RequestOrigin::default())
            .unwrap_err();
        assert_eq!(err.to_string(), INVALID_ACTIVITY_TYPE);
    }

    #[test]
    fn test_filter_parsing() {
        let params = ActivityLogsParams {
            workspace_id: Some("7".into()),
            activity_type: Some("login".into()),
            start_date: Some("2026-10-01".into()),
            end_date: Some("2026-10-14T23:59:59Z".into()),
            limit: Some("abc".into()),
            offset: Some("20".into()),
            search: Some("  ".into()),
            ..Default::default()
        };
        let filter = params.to_filter().unwrap();
        assert_eq!(filter.workspace_id, WorkspaceId(7));
        assert_eq!(filter.activity_type, Some(ActivityType::Login));
        assert_eq!(
            filter.start_date.unwrap().to_rfc3339(),
            "2026-10-01T00:00:00+00:00"
        );
        assert_eq!(filter.limit, 0);
        assert_eq!(filter.offset, 20);
        assert_eq!(filter.search, None);
    }

    #[test]
    fn test_filter_rejects_bad_values() {
        let params = ActivityLogsParams {
            workspace_id: Some("7".into()),
            start_date: Some("yesterday".into()),
            ..Default::default()
        };
        assert!(matches!(params.to_filter(), Err(ApiError::BadRequest(_))));

        let missing = ActivityLogsParams::default();
        assert_eq!(
            missing.workspace_id().unwrap_err().to_string(),
            WORKSPACE_ID_REQUIRED
        );
    }

    #[test]
    fn test_entry_dto_serializes_wire_names() {
        let now = Utc::now();
        let entry = ActivityLogEntry {
            id: leadbase_types::ActivityLogId::new(),
            workspace_id: WorkspaceId(3),
            user_id: UserId::new(),
            member_email: "a@b.com".into(),
            member_name: None,
            activity_type: ActivityType::WebhookCreated,
            activity_description: "x".into(),
            metadata: None,
            ip_address: None,
            user_agent: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(ActivityLogDto::from(entry)).unwrap();
        assert_eq!(json["activity_type"], "webhook_created");
        assert_eq!(json["workspace_id"], 3);
    }
}
