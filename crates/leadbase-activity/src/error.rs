//! Activity error types

use leadbase_db::DbError;
use thiserror::Error;

pub type ActivityResult<T> = Result<T, ActivityError>;

#[derive(Debug, Error)]
pub enum ActivityError {
    /// Missing or malformed input, rejected before any I/O
    #[error("{0}")]
    Validation(String),

    /// Caller is neither the workspace owner nor an accepted member
    #[error("You don't have access to this workspace")]
    AccessDenied,

    #[error(transparent)]
    Store(#[from] DbError),
}
