//! Activity Logger
//!
//! The write path. Every call returns a [`LogOutcome`]; nothing here
//! returns `Err` or panics, so a failed audit write can never fail the
//! business operation that triggered it.
//!
//! LOGIN writes are suppressed while an earlier LOGIN for the same
//! `(workspace_id, user_id)` is inside the cooling period. The check and the
//! insert are not atomic, so two concurrent logins can both be written;
//! the cooling period damps floods, it is not a uniqueness constraint.

use async_trait::async_trait;
use leadbase_db::ActivityLogStore;
use leadbase_types::{
    ActivityLogEntry, ActivityMetadata, ActivityType, Clock, NewActivityLog, UserId, WorkspaceId,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::ActivityConfig;

pub const MISSING_PARAMETERS: &str =
    "Missing required parameters: workspace_id, user_id, member_email, and activity_type are required";

pub const COOLING_PERIOD_SKIPPED: &str = "Login activity skipped due to cooling period";

// ============================================================================
// Request / outcome
// ============================================================================

/// Untyped log request, as received from HTTP clients and other loosely
/// typed callers. Validated into a [`NewActivityLog`] before any I/O.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogActivityRequest {
    pub workspace_id: Option<WorkspaceId>,
    pub user_id: Option<UserId>,
    pub member_email: Option<String>,
    pub member_name: Option<String>,
    pub activity_type: Option<String>,
    /// Defaults to the registry sentence for the activity type
    pub activity_description: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl From<NewActivityLog> for LogActivityRequest {
    fn from(log: NewActivityLog) -> Self {
        Self {
            workspace_id: Some(log.workspace_id),
            user_id: Some(log.user_id),
            member_email: Some(log.member_email),
            member_name: log.member_name,
            activity_type: Some(log.activity_type.to_string()),
            activity_description: Some(log.activity_description),
            metadata: log.metadata.map(ActivityMetadata::into_value),
            ip_address: log.ip_address,
            user_agent: log.user_agent,
        }
    }
}

/// Result of a log call.
#[derive(Debug, Clone, PartialEq)]
pub enum LogOutcome {
    /// The entry was persisted
    Logged(ActivityLogEntry),
    /// LOGIN suppressed by the cooling period; counts as success
    Skipped { message: String },
    /// Validation failed; nothing was written
    Rejected { error: String },
    /// The store refused the insert
    Failed { error: String },
}

impl LogOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Logged(_) | Self::Skipped { .. })
    }

    pub fn entry(&self) -> Option<&ActivityLogEntry> {
        match self {
            Self::Logged(entry) => Some(entry),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Skipped { message } => Some(message),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Rejected { error } | Self::Failed { error } => Some(error),
            _ => None,
        }
    }

    fn metric_label(&self) -> &'static str {
        match self {
            Self::Logged(_) => "logged",
            Self::Skipped { .. } => "skipped",
            Self::Rejected { .. } => "rejected",
            Self::Failed { .. } => "failed",
        }
    }

    /// The `{success, data?, error?, message?}` shape.
    pub fn into_result(self) -> LogResult {
        let success = self.is_success();
        match self {
            Self::Logged(entry) => LogResult {
                success,
                data: Some(entry),
                error: None,
                message: None,
            },
            Self::Skipped { message } => LogResult {
                success,
                data: None,
                error: None,
                message: Some(message),
            },
            Self::Rejected { error } | Self::Failed { error } => LogResult {
                success,
                data: None,
                error: Some(error),
                message: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ActivityLogEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ============================================================================
// Logger
// ============================================================================

#[derive(Clone)]
pub struct ActivityLogger {
    store: Arc<dyn ActivityLogStore>,
    clock: Arc<dyn Clock>,
    config: ActivityConfig,
}

impl ActivityLogger {
    pub fn new(
        store: Arc<dyn ActivityLogStore>,
        clock: Arc<dyn Clock>,
        config: ActivityConfig,
    ) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &ActivityConfig {
        &self.config
    }

    /// Validate and persist an untyped request.
    pub async fn log_activity(&self, request: LogActivityRequest) -> LogOutcome {
        match validate_request(request) {
            Ok(log) => self.log(log).await,
            Err(error) => finish(LogOutcome::Rejected { error }),
        }
    }

    /// Persist a typed entry.
    pub async fn log(&self, log: NewActivityLog) -> LogOutcome {
        let log = log.normalized();
        if let Err(error) = self.check(&log) {
            return finish(LogOutcome::Rejected { error });
        }

        debug!(
            workspace_id = %log.workspace_id,
            user_id = %log.user_id,
            activity_type = %log.activity_type,
            "Logging activity"
        );

        if log.activity_type.has_cooling_period() && self.in_cooling_period(&log).await {
            info!(
                workspace_id = %log.workspace_id,
                user_id = %log.user_id,
                "Login activity skipped due to cooling period"
            );
            return finish(LogOutcome::Skipped {
                message: COOLING_PERIOD_SKIPPED.to_string(),
            });
        }

        match self.store.insert(&log).await {
            Ok(entry) => finish(LogOutcome::Logged(entry)),
            Err(e) => {
                error!(
                    workspace_id = %log.workspace_id,
                    user_id = %log.user_id,
                    activity_type = %log.activity_type,
                    error = %e,
                    "Failed to insert activity log"
                );
                finish(LogOutcome::Failed {
                    error: e.to_string(),
                })
            }
        }
    }

    fn check(&self, log: &NewActivityLog) -> Result<(), String> {
        if log.member_email.trim().is_empty() {
            return Err(MISSING_PARAMETERS.to_string());
        }

        if let Some(metadata) = &log.metadata {
            let unknown = metadata.unknown_fields(log.activity_type);
            if !unknown.is_empty() {
                if self.config.strict_metadata {
                    return metadata
                        .validate_for(log.activity_type)
                        .map_err(|e| e.to_string());
                }
                warn!(
                    activity_type = %log.activity_type,
                    fields = ?unknown,
                    "Activity metadata carries undocumented fields"
                );
            }
        }
        Ok(())
    }

    /// A failed lookup counts as "no recent login".
    async fn in_cooling_period(&self, log: &NewActivityLog) -> bool {
        let since = self.clock.now() - self.config.cooling_window();
        match self
            .store
            .find_recent(log.workspace_id, log.user_id, log.activity_type, since)
            .await
        {
            Ok(recent) => recent.is_some(),
            Err(e) => {
                warn!(
                    workspace_id = %log.workspace_id,
                    user_id = %log.user_id,
                    error = %e,
                    "Cooling period check failed, logging anyway"
                );
                false
            }
        }
    }
}

fn finish(outcome: LogOutcome) -> LogOutcome {
    counter!("activity_log_writes_total", "outcome" => outcome.metric_label()).increment(1);
    if let LogOutcome::Rejected { error } = &outcome {
        warn!(error = %error, "Activity log request rejected");
    }
    outcome
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn validate_request(request: LogActivityRequest) -> Result<NewActivityLog, String> {
    let (Some(workspace_id), Some(user_id), Some(member_email), Some(activity_type)) = (
        request.workspace_id,
        request.user_id,
        non_blank(request.member_email),
        non_blank(request.activity_type),
    ) else {
        return Err(MISSING_PARAMETERS.to_string());
    };

    let activity_type: ActivityType = activity_type.trim().parse().map_err(|e| format!("{e}"))?;

    let metadata = request
        .metadata
        .filter(|v| !v.is_null())
        .map(ActivityMetadata::try_from)
        .transpose()
        .map_err(|e| e.to_string())?;

    let activity_description = non_blank(request.activity_description)
        .unwrap_or_else(|| activity_type.describe(&member_email, None, None));

    Ok(NewActivityLog {
        workspace_id,
        user_id,
        member_email,
        member_name: request.member_name,
        activity_type,
        activity_description,
        metadata,
        ip_address: request.ip_address,
        user_agent: request.user_agent,
    })
}

// ============================================================================
// Fire-and-forget recording
// ============================================================================

/// Side-effect logging for business operations. `record` returns nothing:
/// failures and timeouts are reported through tracing only.
#[async_trait]
pub trait ActivityRecorder: Send + Sync {
    async fn record(&self, event: NewActivityLog);
}

#[async_trait]
impl ActivityRecorder for ActivityLogger {
    async fn record(&self, event: NewActivityLog) {
        let workspace_id = event.workspace_id;
        let activity_type = event.activity_type;

        match tokio::time::timeout(self.config.record_timeout, self.log(event)).await {
            Ok(outcome) if outcome.is_success() => {}
            Ok(outcome) => warn!(
                workspace_id = %workspace_id,
                activity_type = %activity_type,
                error = outcome.error().unwrap_or_default(),
                "Activity not recorded"
            ),
            Err(_) => {
                counter!("activity_log_record_timeouts_total").increment(1);
                warn!(
                    workspace_id = %workspace_id,
                    activity_type = %activity_type,
                    timeout = ?self.config.record_timeout,
                    "Activity recording timed out"
                );
            }
        }
    }
}
