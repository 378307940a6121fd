//! Local-clone fallback
//!
//! When the API is unavailable, repository metadata and commit activity are
//! derived from a shallow clone in a temporary directory that is removed when
//! the operation finishes. Social counts and per-day commit granularity do not
//! exist locally and are reported as zero.

use async_trait::async_trait;
use repolens_core::{
    git_error, with_timeout, CloneStats, CommitActivity, ErrorContext, GitHubConfig, Provenance, RepoId,
    RepoLensError, RepoLensResult, RepositoryMetadata, WeekActivity,
};
use std::path::Path;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, info};

const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_WEEK: i64 = 7 * SECONDS_PER_DAY;
const HISTORY_DAYS: i64 = 365;

pub const NO_DESCRIPTION: &str = "No description available";

/// Data source used when the hosting API cannot be used
#[async_trait]
pub trait LocalFallback: Send + Sync {
    async fn repository_info(&self, repo: &RepoId) -> RepoLensResult<RepositoryMetadata>;

    async fn commit_activity(&self, repo: &RepoId) -> RepoLensResult<CommitActivity>;
}

/// Fallback backed by the system `git` binary
#[derive(Debug, Clone)]
pub struct GitCloneFallback {
    clone_base_url: String,
    /// 0 means a full clone
    depth: u32,
    git_timeout_ms: u64,
}

impl GitCloneFallback {
    pub fn new(config: &GitHubConfig) -> Self {
        Self {
            clone_base_url: config.clone_base_url.trim_end_matches('/').to_string(),
            depth: config.clone_depth,
            git_timeout_ms: config.git_timeout_seconds * 1000,
        }
    }

    pub fn clone_url(&self, repo: &RepoId) -> String {
        format!("{}/{}/{}.git", self.clone_base_url, repo.owner, repo.name)
    }

    /// Clone into a fresh temporary directory; the clone lives as long as the returned guard
    async fn clone_into_temp(&self, repo: &RepoId, extra_args: &[String]) -> RepoLensResult<TempDir> {
        let workspace = tempfile::Builder::new()
            .prefix("repolens-")
            .tempdir()
            .map_err(|e| git_error!(format!("Failed to create temporary workspace: {}", e), "clone"))?;

        let clone_url = self.clone_url(repo);
        info!(repo = %repo, target = %workspace.path().display(), "Cloning repository for local fallback");

        let mut cmd = Command::new("git");
        cmd.arg("clone").arg("--quiet").arg("--single-branch");
        cmd.args(extra_args);
        cmd.arg(&clone_url).arg(workspace.path());
        cmd.env("GIT_TERMINAL_PROMPT", "0").kill_on_drop(true);

        let output = with_timeout(cmd.output(), self.git_timeout_ms, "git_clone")
            .await?
            .map_err(|e| RepoLensError::Git {
                message: format!("Failed to execute git clone: {}", e),
                command: Some("clone".to_string()),
                context: ErrorContext::new("git_fallback")
                    .with_operation("clone")
                    .with_repository(repo)
                    .with_suggestion("Ensure git is installed and accessible"),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Box::new(RepoLensError::Git {
                message: format!("Git clone failed: {}", stderr.trim()),
                command: Some("clone".to_string()),
                context: ErrorContext::new("git_fallback")
                    .with_operation("clone")
                    .with_repository(repo)
                    .with_metadata("url", &clone_url)
                    .with_suggestion("Check repository URL and access permissions"),
            }));
        }

        Ok(workspace)
    }

    fn depth_args(&self) -> Vec<String> {
        if self.depth == 0 {
            Vec::new()
        } else {
            vec!["--depth".to_string(), self.depth.to_string()]
        }
    }

    /// Run a git command inside `dir` and return trimmed stdout
    async fn git(&self, dir: &Path, args: &[&str]) -> RepoLensResult<String> {
        let subcommand = args.first().copied().unwrap_or("git");
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(dir).args(args).kill_on_drop(true);

        let output = with_timeout(cmd.output(), self.git_timeout_ms, "git_command")
            .await?
            .map_err(|e| git_error!(format!("Failed to execute git {}: {}", args.join(" "), e), subcommand))?;

        if !output.status.success() {
            return Err(Box::new(git_error!(
                format!(
                    "git {} exited with {}",
                    args.join(" "),
                    output.status.code().unwrap_or(-1)
                ),
                subcommand
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl LocalFallback for GitCloneFallback {
    async fn repository_info(&self, repo: &RepoId) -> RepoLensResult<RepositoryMetadata> {
        let workspace = self.clone_into_temp(repo, &self.depth_args()).await?;
        let dir = workspace.path();

        let commit_count = self
            .git(dir, &["rev-list", "--count", "HEAD"])
            .await
            .ok()
            .and_then(|out| out.parse().ok())
            .unwrap_or(0);
        let last_commit_date = self
            .git(dir, &["log", "-1", "--format=%cI"])
            .await
            .ok()
            .filter(|out| !out.is_empty());
        let branch_count = self
            .git(dir, &["branch", "-r"])
            .await
            .map(|out| out.lines().filter(|l| !l.trim().is_empty()).count() as u64)
            .unwrap_or(0);
        // Absent config keys make git exit with status 1
        let description = self
            .git(dir, &["config", "--get", "remote.origin.description"])
            .await
            .ok()
            .filter(|out| !out.is_empty())
            .unwrap_or_else(|| NO_DESCRIPTION.to_string());

        debug!(repo = %repo, commit_count, branch_count, "Collected local repository info");

        Ok(RepositoryMetadata {
            id: repo.clone(),
            description: Some(description),
            stars: 0,
            forks: 0,
            watchers: 0,
            open_issues: 0,
            language: None,
            clone_url: Some(self.clone_url(repo)),
            homepage: None,
            provenance: Provenance::GitFallback,
            clone_stats: Some(CloneStats {
                commit_count,
                last_commit_date,
                branch_count,
            }),
        })
    }

    async fn commit_activity(&self, repo: &RepoId) -> RepoLensResult<CommitActivity> {
        let now = chrono::Utc::now().timestamp();
        let since = chrono::Utc::now() - chrono::Duration::days(HISTORY_DAYS);

        // A year of history is needed; a depth-limited clone would only see its tip.
        // Repositories without commits in that window reject --shallow-since.
        let shallow = vec![format!("--shallow-since={}", since.format("%Y-%m-%d"))];
        let workspace = match self.clone_into_temp(repo, &shallow).await {
            Ok(workspace) => workspace,
            Err(err) => {
                debug!(repo = %repo, error = %err, "Shallow-since clone failed, retrying with depth");
                self.clone_into_temp(repo, &self.depth_args()).await?
            }
        };

        let since_arg = format!("--since={}", since.to_rfc3339());
        let log = self
            .git(workspace.path(), &["log", &since_arg, "--format=%ct"])
            .await?;
        let timestamps: Vec<i64> = log
            .lines()
            .filter_map(|line| line.trim().parse().ok())
            .collect();

        debug!(repo = %repo, commits = timestamps.len(), "Collected local commit history");

        Ok(CommitActivity::new(
            bucket_commit_timestamps(&timestamps, now),
            Provenance::GitFallback,
        ))
    }
}

/// Bucket commit timestamps into consecutive 7-day windows covering the 365 days before `now`.
///
/// Per-day counts are unknown locally and left at zero.
pub fn bucket_commit_timestamps(timestamps: &[i64], now: i64) -> Vec<WeekActivity> {
    let start = now - HISTORY_DAYS * SECONDS_PER_DAY;
    let mut weeks = Vec::new();
    let mut week_start = start;

    while week_start < now {
        let week_end = week_start + SECONDS_PER_WEEK;
        let total = timestamps
            .iter()
            .filter(|ts| **ts >= week_start && **ts < week_end)
            .count() as u64;
        weeks.push(WeekActivity::new(week_start, total, [0; 7]));
        week_start = week_end;
    }

    weeks
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn test_bucket_count_covers_a_year() {
        let weeks = bucket_commit_timestamps(&[], NOW);
        assert_eq!(weeks.len(), 53);
        assert_eq!(weeks[0].week, NOW - 365 * SECONDS_PER_DAY);
        assert!(weeks.iter().all(|w| w.total == 0 && w.days == [0; 7]));
    }

    #[test]
    fn test_bucket_assignment() {
        let start = NOW - 365 * SECONDS_PER_DAY;
        let timestamps = [
            start,
            start + 1,
            start + SECONDS_PER_WEEK,
            NOW - 1,
            // outside the window
            start - 10,
        ];
        let weeks = bucket_commit_timestamps(&timestamps, NOW);

        assert_eq!(weeks[0].total, 2);
        assert_eq!(weeks[1].total, 1);
        assert_eq!(weeks.last().map(|w| w.total), Some(1));
        assert_eq!(weeks.iter().map(|w| w.total).sum::<u64>(), 4);
    }

    #[test]
    fn test_clone_url() {
        let config = GitHubConfig {
            clone_base_url: "https://example.test/".to_string(),
            ..GitHubConfig::default()
        };
        let fallback = GitCloneFallback::new(&config);
        assert_eq!(
            fallback.clone_url(&RepoId::new("octo", "demo")),
            "https://example.test/octo/demo.git"
        );
        assert_eq!(fallback.depth_args(), vec!["--depth", "1"]);
    }
}
