//! Release orchestration: stage, commit, push, gather, announce.
//!
//! The sequence is linear and best-effort. Every stage records a
//! [`StageReport`] instead of propagating its failure, so a broken push or
//! an unreachable webhook never aborts the run; the operator reads the
//! aggregated [`ReleaseSummary`] at the end.

use std::fmt;
use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use tracing::{debug, warn};

use crate::git::{self, GitRepository};
use crate::process::CommandRunner;
use crate::webhook::{
    locate_webhook, PublishOutcome, WebhookPublisher, WebhookSource, FALLBACK_SCRIPT_NAME,
    WEBHOOK_ENV_VAR,
};

/// Default remote branch to push.
pub const DEFAULT_BRANCH: &str = "main";

/// Default number of history entries in the changelog.
pub const DEFAULT_COMMIT_COUNT: usize = 20;

/// Options controlling a release run.
#[derive(Debug, Clone)]
pub struct ReleaseOptions {
    /// Remote branch to push.
    pub branch: String,
    /// Commit message; auto-generated with a UTC timestamp when absent.
    pub message: Option<String>,
    /// Whether to retry a failed push with `--force`, once.
    pub force: bool,
    /// Number of history entries to format into the changelog.
    pub commits: usize,
    /// Explicit webhook endpoint, the highest-priority source.
    pub webhook: Option<String>,
    /// Announcement title; defaults to `Auto push to <branch>`.
    pub title: Option<String>,
}

impl Default for ReleaseOptions {
    fn default() -> Self {
        Self {
            branch: DEFAULT_BRANCH.to_string(),
            message: None,
            force: false,
            commits: DEFAULT_COMMIT_COUNT,
            webhook: None,
            title: None,
        }
    }
}

/// One step of the release sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Stage all working tree changes.
    Staging,
    /// Commit staged changes.
    Commit,
    /// Push the branch to the default remote.
    Push,
    /// Gather recent history into the changelog.
    Changelog,
    /// Announce the changelog to the webhook.
    Publish,
}

impl Stage {
    /// Stable lowercase name used in the summary.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Staging => "stage",
            Self::Commit => "commit",
            Self::Push => "push",
            Self::Changelog => "changelog",
            Self::Publish => "publish",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// How a stage ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    /// The stage did its work.
    Completed,
    /// The stage had nothing to do.
    Skipped,
    /// The stage failed; the run continued regardless.
    Failed,
}

impl StageStatus {
    /// Stable lowercase name used in the summary.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "ok",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Outcome of one stage, kept for the end-of-run summary.
#[derive(Debug, Clone)]
pub struct StageReport {
    /// Which stage this report covers.
    pub stage: Stage,
    /// How it ended.
    pub status: StageStatus,
    /// Human-readable reason or result.
    pub detail: String,
}

impl StageReport {
    fn new(stage: Stage, status: StageStatus, detail: impl Into<String>) -> Self {
        Self {
            stage,
            status,
            detail: detail.into(),
        }
    }
}

/// Aggregated outcome of a release run.
#[derive(Debug)]
pub struct ReleaseSummary {
    /// Per-stage outcomes in execution order.
    pub stages: Vec<StageReport>,
    /// Changelog text that was (or would have been) announced.
    pub changelog: String,
    /// Outcome of the webhook publish.
    pub publish: PublishOutcome,
}

impl ReleaseSummary {
    /// Whether no stage failed (skips are fine).
    pub fn all_clear(&self) -> bool {
        self.stages
            .iter()
            .all(|report| report.status != StageStatus::Failed)
    }

    /// Report for a given stage, if it ran.
    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|report| report.stage == stage)
    }
}

/// Drives the release sequence against one repository.
pub struct ReleaseRunner {
    options: ReleaseOptions,
    repo_path: PathBuf,
    runner: CommandRunner,
    publisher: WebhookPublisher,
}

impl ReleaseRunner {
    /// Creates a runner for the repository at `repo_path`.
    pub fn new<P: Into<PathBuf>>(options: ReleaseOptions, repo_path: P) -> Self {
        let repo_path = repo_path.into();
        let runner = CommandRunner::new(&repo_path);

        Self {
            options,
            repo_path,
            runner,
            publisher: WebhookPublisher::new(),
        }
    }

    /// Runs the full sequence and returns the aggregated summary.
    ///
    /// Infallible by design: stage failures land in the summary, and the
    /// webhook publisher converts its own failures internally.
    pub async fn run(&self) -> ReleaseSummary {
        let mut stages = Vec::new();

        stages.push(self.stage_changes());
        stages.push(self.commit_changes());
        stages.push(self.push_branch());

        let (changelog_report, changelog) = self.gather_changelog();
        stages.push(changelog_report);

        let endpoint = locate_webhook(&self.webhook_sources());
        let title = self
            .options
            .title
            .clone()
            .unwrap_or_else(|| format!("Auto push to {}", self.options.branch));

        let publish = self
            .publisher
            .publish(endpoint.as_deref(), &changelog, &title)
            .await;
        stages.push(publish_report(&publish));

        if publish.delivered() {
            println!("Changelog posted to webhook.");
        } else {
            println!("Failed to post changelog: {}", publish.detail());
        }

        ReleaseSummary {
            stages,
            changelog,
            publish,
        }
    }

    /// STAGE: `git add -A`, streams inherited. Failure is reported, not fatal.
    fn stage_changes(&self) -> StageReport {
        println!("Staging changes...");
        match self.runner.run("git", &["add", "-A"]) {
            Ok(result) if result.success() => {
                StageReport::new(Stage::Staging, StageStatus::Completed, "working tree staged")
            }
            Ok(result) => {
                println!("Staging failed with exit code {}", result.exit_code);
                StageReport::new(
                    Stage::Staging,
                    StageStatus::Failed,
                    format!("git add exited with {}", result.exit_code),
                )
            }
            Err(e) => {
                println!("Staging failed: {e}");
                StageReport::new(Stage::Staging, StageStatus::Failed, e.to_string())
            }
        }
    }

    /// COMMIT: skipped when the working tree is clean; an `ExecutionError`
    /// from git (hook rejection, nothing staged) is reported and absorbed.
    fn commit_changes(&self) -> StageReport {
        let pending = GitRepository::open_at(&self.repo_path)
            .and_then(|repo| repo.working_tree_status());

        match pending {
            Ok(status) if status.clean => {
                println!("No changes to commit.");
                return StageReport::new(
                    Stage::Commit,
                    StageStatus::Skipped,
                    "no changes to commit",
                );
            }
            Ok(status) => {
                debug!(pending_files = status.entries.len(), "Working tree is dirty");
            }
            Err(e) => {
                // Assume dirty and let the commit surface the real failure.
                warn!(error = %e, "Working tree status query failed");
            }
        }

        let message = self
            .options
            .message
            .clone()
            .unwrap_or_else(auto_commit_message);

        println!("Committing changes: {message}");
        match self.runner.run_checked("git", &["commit", "-m", &message]) {
            Ok(_) => StageReport::new(Stage::Commit, StageStatus::Completed, message),
            Err(e) => {
                println!("Commit failed or nothing to commit: {e}");
                StageReport::new(Stage::Commit, StageStatus::Failed, e.to_string())
            }
        }
    }

    /// PUSH: one normal attempt; on failure, exactly one `--force` retry
    /// when the caller asked for it.
    fn push_branch(&self) -> StageReport {
        println!("Pushing to origin {}...", self.options.branch);
        match self
            .runner
            .run_captured("git", &["push", "origin", &self.options.branch])
        {
            Ok(result) if result.success() => StageReport::new(
                Stage::Push,
                StageStatus::Completed,
                format!("pushed origin {}", self.options.branch),
            ),
            Ok(result) => {
                println!("Push failed: {}", result.trimmed_output());
                if self.options.force {
                    self.force_push()
                } else {
                    println!("Use --force to overwrite remote if that is intended.");
                    StageReport::new(
                        Stage::Push,
                        StageStatus::Failed,
                        format!("push exited with {}", result.exit_code),
                    )
                }
            }
            Err(e) => {
                println!("Push failed: {e}");
                StageReport::new(Stage::Push, StageStatus::Failed, e.to_string())
            }
        }
    }

    fn force_push(&self) -> StageReport {
        println!("Attempting force-push...");
        match self
            .runner
            .run_captured("git", &["push", "origin", &self.options.branch, "--force"])
        {
            Ok(result) if result.success() => {
                println!("Force-push succeeded");
                StageReport::new(Stage::Push, StageStatus::Completed, "force-push succeeded")
            }
            Ok(result) => {
                println!("Force-push failed: {}", result.trimmed_output());
                StageReport::new(
                    Stage::Push,
                    StageStatus::Failed,
                    format!("force-push exited with {}", result.exit_code),
                )
            }
            Err(e) => {
                println!("Force-push failed: {e}");
                StageReport::new(Stage::Push, StageStatus::Failed, e.to_string())
            }
        }
    }

    /// GATHER_CHANGELOG: recent history, newest first; any query failure
    /// degrades to the placeholder text.
    fn gather_changelog(&self) -> (StageReport, String) {
        let entries = GitRepository::open_at(&self.repo_path)
            .and_then(|repo| git::recent_commits(repo.repository(), self.options.commits));

        match entries {
            Ok(entries) => {
                let text = git::format_changelog(&entries);
                let report = StageReport::new(
                    Stage::Changelog,
                    StageStatus::Completed,
                    format!("{} entries", entries.len()),
                );
                (report, text)
            }
            Err(e) => {
                warn!(error = %e, "Changelog query failed");
                let report = StageReport::new(Stage::Changelog, StageStatus::Failed, e.to_string());
                (report, git::NO_COMMITS_PLACEHOLDER.to_string())
            }
        }
    }

    /// LOCATE_WEBHOOK provider order: explicit flag, environment variable,
    /// fallback script scan in the repository directory.
    fn webhook_sources(&self) -> Vec<WebhookSource> {
        vec![
            WebhookSource::Explicit(self.options.webhook.clone()),
            WebhookSource::Environment(WEBHOOK_ENV_VAR.to_string()),
            WebhookSource::ScriptScan(self.repo_path.join(FALLBACK_SCRIPT_NAME)),
        ]
    }
}

/// Timestamped message used when the caller supplies none.
fn auto_commit_message() -> String {
    format!(
        "Auto-release: {}",
        Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
    )
}

fn publish_report(outcome: &PublishOutcome) -> StageReport {
    match outcome {
        PublishOutcome::Delivered { status, .. } => StageReport::new(
            Stage::Publish,
            StageStatus::Completed,
            format!("HTTP {status}"),
        ),
        PublishOutcome::NoEndpoint => StageReport::new(
            Stage::Publish,
            StageStatus::Skipped,
            "no webhook endpoint resolved",
        ),
        PublishOutcome::Failed(reason) => {
            StageReport::new(Stage::Publish, StageStatus::Failed, reason.clone())
        }
    }
}
