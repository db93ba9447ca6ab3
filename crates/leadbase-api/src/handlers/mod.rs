//! API Handlers
//!
//! The activity, auth and workspace endpoints dispatch on `?action=`;
//! each action is a documented function of its module.

pub mod activity_logs;
pub mod auth;
pub mod health;
pub mod workspace;

pub use health::*;
