//! Activity metadata
//!
//! An open, string-keyed JSON object attached to an activity entry. Each
//! activity kind documents the keys it uses; dashboards key off these names
//! (`old_status`, `new_status`, `webhook_url`, `additional_info.tag_color`),
//! so the allow-list below is the schema callers are held to.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::activity_type::ActivityType;
use crate::error::TypesError;

/// Metadata field names.
pub mod fields {
    pub const LEAD_ID: &str = "lead_id";
    pub const LEAD_NAME: &str = "lead_name";
    pub const LEAD_EMAIL: &str = "lead_email";
    pub const OLD_STATUS: &str = "old_status";
    pub const NEW_STATUS: &str = "new_status";
    pub const ASSIGNED_TO: &str = "assigned_to";

    pub const TARGET_MEMBER_ID: &str = "target_member_id";
    pub const TARGET_MEMBER_EMAIL: &str = "target_member_email";
    pub const OLD_ROLE: &str = "old_role";
    pub const NEW_ROLE: &str = "new_role";

    pub const STATUS_ID: &str = "status_id";
    pub const STATUS_NAME: &str = "status_name";
    pub const TAG_ID: &str = "tag_id";
    pub const TAG_NAME: &str = "tag_name";

    pub const WEBHOOK_ID: &str = "webhook_id";
    pub const WEBHOOK_NAME: &str = "webhook_name";
    pub const WEBHOOK_URL: &str = "webhook_url";

    pub const WORKSPACE_NAME: &str = "workspace_name";
    pub const INVITE_ID: &str = "invite_id";

    pub const RESOURCE_ID: &str = "resource_id";
    pub const RESOURCE_TYPE: &str = "resource_type";
    pub const CHANGES: &str = "changes";
    pub const ADDITIONAL_INFO: &str = "additional_info";
}

use fields::*;

/// Keys every activity kind may carry.
pub const COMMON_FIELDS: &[&str] = &[RESOURCE_ID, RESOURCE_TYPE, CHANGES, ADDITIONAL_INFO];

const LEAD_FIELDS: &[&str] = &[LEAD_ID, LEAD_NAME, LEAD_EMAIL, OLD_STATUS, NEW_STATUS, ASSIGNED_TO];
const MEMBER_FIELDS: &[&str] = &[TARGET_MEMBER_ID, TARGET_MEMBER_EMAIL, OLD_ROLE, NEW_ROLE];
const INVITE_FIELDS: &[&str] = &[TARGET_MEMBER_EMAIL, NEW_ROLE, INVITE_ID, WORKSPACE_NAME];
const STATUS_FIELDS: &[&str] = &[STATUS_ID, STATUS_NAME];
const TAG_FIELDS: &[&str] = &[TAG_ID, TAG_NAME];
const WEBHOOK_FIELDS: &[&str] = &[WEBHOOK_ID, WEBHOOK_NAME, WEBHOOK_URL];
const WORKSPACE_FIELDS: &[&str] = &[WORKSPACE_NAME];

/// Keys specific to an activity kind, on top of [`COMMON_FIELDS`].
pub fn kind_fields(activity_type: ActivityType) -> &'static [&'static str] {
    use ActivityType::*;
    match activity_type {
        LeadCreated | LeadUpdated | LeadDeleted | LeadStatusChanged | LeadAssigned
        | LeadUnassigned => LEAD_FIELDS,
        MemberAdded | MemberRemoved | MemberRoleChanged => MEMBER_FIELDS,
        WorkspaceInviteSent | WorkspaceInviteAccepted | WorkspaceInviteDeclined => INVITE_FIELDS,
        StatusCreated | StatusUpdated | StatusDeleted => STATUS_FIELDS,
        TagCreated | TagUpdated | TagDeleted => TAG_FIELDS,
        WebhookCreated | WebhookUpdated | WebhookDeleted => WEBHOOK_FIELDS,
        Login | Logout | WorkspaceJoin | WorkspaceLeave | WorkspaceCreated | WorkspaceUpdated
        | SettingsChanged => WORKSPACE_FIELDS,
        PasswordChange | ProfileUpdated | DataExport | DataImport => &[],
    }
}

/// Whether `field` is documented for `activity_type`.
pub fn is_allowed_field(activity_type: ActivityType, field: &str) -> bool {
    COMMON_FIELDS.contains(&field) || kind_fields(activity_type).contains(&field)
}

/// Semi-structured bag of activity-specific values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityMetadata(Map<String, Value>);

impl ActivityMetadata {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Insert a field, builder style.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Insert a field only when a value is present.
    pub fn with_opt(self, key: &str, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }

    /// Insert a key under the nested `additional_info` object.
    pub fn with_info(mut self, key: &str, value: impl Into<Value>) -> Self {
        let info = self
            .0
            .entry(ADDITIONAL_INFO.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = info {
            map.insert(key.to_string(), value.into());
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Keys that are not in the allow-list of `activity_type`, sorted.
    pub fn unknown_fields(&self, activity_type: ActivityType) -> Vec<String> {
        let mut unknown: Vec<String> = self
            .0
            .keys()
            .filter(|k| !is_allowed_field(activity_type, k))
            .cloned()
            .collect();
        unknown.sort();
        unknown
    }

    /// Fail when any key is outside the allow-list of `activity_type`.
    pub fn validate_for(&self, activity_type: ActivityType) -> Result<(), TypesError> {
        let fields = self.unknown_fields(activity_type);
        if fields.is_empty() {
            Ok(())
        } else {
            Err(TypesError::UnknownMetadataFields {
                activity_type: activity_type.to_string(),
                fields,
            })
        }
    }
}

impl TryFrom<Value> for ActivityMetadata {
    type Error = TypesError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(TypesError::MetadataNotObject),
        }
    }
}

impl From<Map<String, Value>> for ActivityMetadata {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_with_info_nests_under_additional_info() {
        let meta = ActivityMetadata::new()
            .with(TAG_NAME, "VIP")
            .with_info("tag_color", "#ff0000");
        assert_eq!(
            meta.into_value(),
            json!({"tag_name": "VIP", "additional_info": {"tag_color": "#ff0000"}})
        );
    }

    #[test]
    fn test_allow_list_per_kind() {
        let meta = ActivityMetadata::new()
            .with(OLD_STATUS, "New")
            .with(NEW_STATUS, "Won")
            .with(RESOURCE_TYPE, "lead");
        assert!(meta.validate_for(ActivityType::LeadStatusChanged).is_ok());

        let err = meta.validate_for(ActivityType::TagCreated).unwrap_err();
        assert_eq!(
            err,
            TypesError::UnknownMetadataFields {
                activity_type: "tag_created".into(),
                fields: vec!["new_status".into(), "old_status".into()],
            }
        );
    }

    #[test]
    fn test_typo_is_reported() {
        let meta = ActivityMetadata::new().with("webhok_url", "https://x");
        assert_eq!(
            meta.unknown_fields(ActivityType::WebhookCreated),
            vec!["webhok_url".to_string()]
        );
    }

    #[test]
    fn test_non_object_rejected() {
        assert_eq!(
            ActivityMetadata::try_from(json!([1, 2])).unwrap_err(),
            TypesError::MetadataNotObject
        );
        assert!(ActivityMetadata::try_from(json!({"a": 1})).is_ok());
    }
}
