//! Changelog assembly from recent commit history.

use std::fmt;

use anyhow::{Context, Result};
use git2::{Commit, Repository};

use crate::git::SHORT_HASH_LEN;

/// Placeholder published when history yields no entries.
pub const NO_COMMITS_PLACEHOLDER: &str = "(no commits found)";

/// One line of the published changelog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    /// Abbreviated commit hash.
    pub short_hash: String,
    /// Commit author name.
    pub author: String,
    /// First line of the commit message.
    pub subject: String,
}

impl ChangelogEntry {
    /// Builds an entry from a git2 commit.
    pub fn from_git_commit(commit: &Commit) -> Self {
        let hash = commit.id().to_string();
        let short_hash = hash.chars().take(SHORT_HASH_LEN).collect();

        let author = commit.author().name().unwrap_or("Unknown").to_string();
        let subject = commit.summary().unwrap_or("").to_string();

        Self {
            short_hash,
            author,
            subject,
        }
    }
}

impl fmt::Display for ChangelogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}: {}", self.short_hash, self.author, self.subject)
    }
}

/// Collects the most recent `limit` commits reachable from HEAD, newest first.
///
/// An unborn HEAD (repository with no commits yet) yields an empty list.
pub fn recent_commits(repo: &Repository, limit: usize) -> Result<Vec<ChangelogEntry>> {
    if repo.head().is_err() {
        return Ok(Vec::new());
    }

    let mut walker = repo.revwalk().context("Failed to create revwalk")?;
    walker.push_head().context("Failed to push HEAD")?;

    let mut entries = Vec::new();
    for oid in walker.take(limit) {
        let oid = oid.context("Failed to get commit OID from walker")?;
        let commit = repo
            .find_commit(oid)
            .context("Failed to find commit")?;
        entries.push(ChangelogEntry::from_git_commit(&commit));
    }

    Ok(entries)
}

/// Renders entries into the text posted to the webhook.
pub fn format_changelog(entries: &[ChangelogEntry]) -> String {
    if entries.is_empty() {
        return NO_COMMITS_PLACEHOLDER.to_string();
    }

    entries
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(hash: &str, author: &str, subject: &str) -> ChangelogEntry {
        ChangelogEntry {
            short_hash: hash.to_string(),
            author: author.to_string(),
            subject: subject.to_string(),
        }
    }

    #[test]
    fn entry_renders_hash_author_subject() {
        let line = entry("abc123", "Alice", "fix bug").to_string();
        assert_eq!(line, "abc123 - Alice: fix bug");
    }

    #[test]
    fn format_joins_entries_with_newlines() {
        let entries = vec![
            entry("abc123", "Alice", "fix bug"),
            entry("def456", "Bob", "add feature"),
            entry("789abc", "Alice", "initial commit"),
        ];
        assert_eq!(
            format_changelog(&entries),
            "abc123 - Alice: fix bug\ndef456 - Bob: add feature\n789abc - Alice: initial commit"
        );
    }

    #[test]
    fn format_substitutes_placeholder_when_empty() {
        assert_eq!(format_changelog(&[]), NO_COMMITS_PLACEHOLDER);
    }
}
