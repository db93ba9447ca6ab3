//! Data Transfer Objects
//!
//! Request and response structures for the API. Field names and shapes
//! are part of the client contract.

pub mod activity;
pub mod auth;
pub mod common;
pub mod workspace;

pub use activity::*;
pub use auth::*;
pub use common::*;
pub use workspace::*;
