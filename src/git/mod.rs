//! Git operations: repository discovery, diffs, staging and commits.

pub mod repo;
pub mod staging;

pub use repo::{DiffScope, Git, StagedSet, check_git_installed};
pub use staging::{StageResult, StagingGuard, StagingReconciler, newly_staged};
