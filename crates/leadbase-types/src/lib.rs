//! # Leadbase Types
//!
//! Canonical domain types for the member activity trail.
//!
//! - **Identity**: `UserId`, `WorkspaceId`, `ActivityLogId`, the acting
//!   `Actor` and the `RequestOrigin` of a request
//! - **Registry**: the closed `ActivityType` set with labels and default
//!   description sentences
//! - **Metadata**: the per-kind field allow-list over an open JSON object
//! - **Entries**: persisted entries, write requests, list filters, pages
//!   and aggregate stats
//!
//! This crate has no dependency on other leadbase crates.

pub mod activity_type;
pub mod clock;
pub mod entry;
pub mod error;
pub mod identity;
pub mod metadata;

pub use activity_type::{ActivityType, ActivityTypeOption};
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{
    ActivityLogEntry, ActivityLogFilter, ActivityLogPage, ActivityLogStats, ActivityTypeCount,
    MemberActivityCount, NewActivityLog,
};
pub use error::{Result, TypesError};
pub use identity::{ActivityLogId, Actor, RequestOrigin, UserId, WorkspaceId};
pub use metadata::{fields, ActivityMetadata};
