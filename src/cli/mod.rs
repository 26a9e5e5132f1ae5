//! CLI interface for git-herald.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::release::{ReleaseOptions, ReleaseRunner, ReleaseSummary};

/// git-herald: stage, commit, push, and announce the changelog.
#[derive(Parser)]
#[command(name = "git-herald")]
#[command(about = "Stage, commit, and push a repository, then announce the changelog to a webhook", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Remote branch to push.
    #[arg(long, default_value = "main")]
    pub branch: String,

    /// Commit message; an Auto-release message with the current UTC
    /// timestamp is used when omitted.
    #[arg(long)]
    pub message: Option<String>,

    /// Retry a failed push with --force, once.
    #[arg(long)]
    pub force: bool,

    /// Number of history entries to format into the changelog.
    #[arg(long, default_value_t = 20)]
    pub commits: usize,

    /// Webhook endpoint; takes priority over DISCORD_WEBHOOK and the
    /// auto_push.ps1 fallback scan.
    #[arg(long)]
    pub webhook: Option<String>,

    /// Announcement title; defaults to "Auto push to <branch>".
    #[arg(long)]
    pub title: Option<String>,

    /// Repository directory to operate on.
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,
}

impl Cli {
    /// Executes the release run and prints the aggregated stage summary.
    ///
    /// Operational failures live in the summary, never in the returned
    /// `Result`; the process exits zero for them.
    pub async fn execute(self) -> Result<()> {
        let repo = self.repo.clone();
        let options = ReleaseOptions {
            branch: self.branch,
            message: self.message,
            force: self.force,
            commits: self.commits,
            webhook: self.webhook,
            title: self.title,
        };

        let summary = ReleaseRunner::new(options, repo).run().await;
        print_summary(&summary);

        Ok(())
    }
}

/// Prints the end-of-run stage summary.
fn print_summary(summary: &ReleaseSummary) {
    println!();
    println!("Release summary:");
    for report in &summary.stages {
        println!("  {:<10} {:<8} {}", report.stage, report.status, report.detail);
    }

    if summary.all_clear() {
        println!("✅ Release run complete");
    } else {
        println!("Release run finished with failures, see summary above");
    }
}
