//! Common DTO types

use serde::Deserialize;
use utoipa::IntoParams;

/// `?action=` selector of the action-dispatch endpoints
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActionQuery {
    /// Operation to run
    pub action: Option<String>,
}

impl ActionQuery {
    pub fn action(&self) -> &str {
        self.action.as_deref().unwrap_or_default()
    }
}
