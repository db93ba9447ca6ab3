//! Leadbase member activity core
//!
//! Three services over the activity store and the workspace directory:
//!
//! - [`AccessGuard`]: owner-or-accepted-member check, fails closed
//! - [`ActivityLogger`]: validated writes with the LOGIN cooling period;
//!   never returns an error to its caller
//! - [`ActivityQueryService`]: paginated listing and workspace statistics
//!
//! The [`events`] module holds typed builders for the entries business
//! operations emit, and [`ActivityRecorder`] is the fire-and-forget seam
//! those operations call.

pub mod config;
pub mod error;
pub mod events;
pub mod guard;
pub mod logger;
pub mod query;
pub mod stats;

pub use config::ActivityConfig;
pub use error::{ActivityError, ActivityResult};
pub use guard::AccessGuard;
pub use logger::{
    ActivityLogger, ActivityRecorder, LogActivityRequest, LogOutcome, LogResult,
    COOLING_PERIOD_SKIPPED, MISSING_PARAMETERS,
};
pub use query::ActivityQueryService;
pub use stats::StatsWindows;
