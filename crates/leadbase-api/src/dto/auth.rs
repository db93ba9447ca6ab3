//! Session DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const SIGNOUT_SUCCESS: &str = "Logged out successfully";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignOutResponse {
    pub message: String,
}

impl Default for SignOutResponse {
    fn default() -> Self {
        Self {
            message: SIGNOUT_SUCCESS.to_string(),
        }
    }
}
