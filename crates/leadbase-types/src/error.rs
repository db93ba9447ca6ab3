//! Error types for parsing and validating Leadbase domain values

use thiserror::Error;

/// Result type for domain value parsing
pub type Result<T> = std::result::Result<T, TypesError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    /// Value is not a member of the closed activity type registry
    #[error("Invalid activity type: {0}")]
    UnknownActivityType(String),

    #[error("Invalid workspace_id format: {0}")]
    InvalidWorkspaceId(String),

    #[error("Invalid user_id format: {0}")]
    InvalidUserId(String),

    /// Metadata must be a JSON object
    #[error("Metadata must be a JSON object")]
    MetadataNotObject,

    /// Metadata carries keys outside the allow-list of its activity type
    #[error("Unknown metadata fields for {activity_type}: {}", fields.join(", "))]
    UnknownMetadataFields {
        activity_type: String,
        fields: Vec<String>,
    },
}
