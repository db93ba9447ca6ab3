//! Repository implementations

mod activity_log;
mod workspace;

pub use activity_log::ActivityLogRepo;
pub use workspace::WorkspaceRepo;
