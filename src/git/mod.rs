//! Git operations and repository queries.

pub mod changelog;
pub mod repository;

pub use changelog::{format_changelog, recent_commits, ChangelogEntry, NO_COMMITS_PLACEHOLDER};
pub use repository::{FileStatus, GitRepository, WorkingTreeStatus};

/// Number of hex characters to show in abbreviated commit hashes.
pub const SHORT_HASH_LEN: usize = 8;
