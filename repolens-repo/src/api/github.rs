//! GitHub API client implementation

use async_trait::async_trait;
use repolens_core::{
    CommitActivity, ContentEntry, ContributorRecord, EntryKind, ErrorContext, Fetched,
    GitHubConfig, IssueRecord, IssueState, Provenance, RepoId, RepoLensError, RepoLensResult,
    RepositoryMetadata, RepositorySource, WeekActivity,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{BTreeMap, VecDeque};
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use super::{create_http_client, response_error};
use crate::content::{decode_base64_content, decode_text, is_binary_path, TextEncoding};
use crate::fallback::{GitCloneFallback, LocalFallback};
use crate::rate_limit::{is_rate_limit_rejection, Decision, RateLimitPolicy, RateLimitState, RequestMode};

/// GitHub API client.
///
/// Owns the rate-limit state for every request it makes. The state lock is held
/// across pacing, the request and the header bookkeeping, so tasks sharing one
/// client are serialized.
pub struct GitHubClient<F = GitCloneFallback> {
    client: reqwest::Client,
    config: GitHubConfig,
    encodings: Vec<TextEncoding>,
    state: Mutex<RateLimitState>,
    fallback: F,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GitHubRepository {
    description: Option<String>,
    stargazers_count: Option<u64>,
    forks_count: Option<u64>,
    watchers_count: Option<u64>,
    open_issues_count: Option<u64>,
    language: Option<String>,
    clone_url: Option<String>,
    homepage: Option<String>,
}

/// Item of a contents listing, or a single file with its payload
#[derive(Debug, Deserialize)]
struct GitHubContent {
    #[serde(default)]
    path: String,
    #[serde(rename = "type", default)]
    kind: EntryKind,
    size: Option<u64>,
    content: Option<String>,
    encoding: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GitHubContributor {
    login: Option<String>,
    contributions: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct GitHubIssue {
    #[serde(default)]
    title: Option<String>,
    state: Option<IssueState>,
    created_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GitHubWeek {
    week: Option<i64>,
    total: Option<u64>,
    days: Option<Vec<Option<u64>>>,
}

impl GitHubClient<GitCloneFallback> {
    /// Create a client that falls back to `git clone`
    pub fn new(config: GitHubConfig) -> RepoLensResult<Self> {
        let fallback = GitCloneFallback::new(&config);
        Self::with_fallback(config, fallback)
    }
}

impl<F: LocalFallback> GitHubClient<F> {
    pub fn with_fallback(config: GitHubConfig, fallback: F) -> RepoLensResult<Self> {
        let client = create_http_client(&config)?;
        let policy = RateLimitPolicy::from(&config);

        let state = if config.access_token.is_some() {
            RateLimitState::new(policy)
        } else {
            warn!("No GitHub token configured; using local clone fallback only");
            RateLimitState::fallback_only(policy)
        };

        let mut encodings = Vec::new();
        for name in &config.encodings {
            match name.parse::<TextEncoding>() {
                Ok(encoding) => encodings.push(encoding),
                Err(err) => warn!(encoding = %name, error = %err, "Ignoring unsupported encoding"),
            }
        }
        if encodings.is_empty() {
            encodings = TextEncoding::defaults();
        }

        info!(base_url = %config.api_base_url, mode = ?state.mode(), "Created GitHub API client");

        Ok(Self {
            client,
            config,
            encodings,
            state: Mutex::new(state),
            fallback,
        })
    }

    /// Current request strategy
    pub async fn mode(&self) -> RequestMode {
        self.state.lock().await.mode()
    }

    /// GET an endpoint and deserialize the JSON body, honouring the rate-limit state
    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, operation: &str) -> RepoLensResult<T> {
        let url = format!(
            "{}/{}",
            self.config.api_base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );

        let mut state = self.state.lock().await;
        match state.decide(chrono::Utc::now().timestamp(), Instant::now()) {
            Decision::UseFallback => {
                return Err(Box::new(RepoLensError::RateLimit {
                    message: "API access disabled for this session".to_string(),
                    reset_at: state.reset_at(),
                    context: ErrorContext::new("github_client").with_operation(operation),
                }));
            }
            Decision::WaitForReset { delay } => {
                warn!(
                    wait_ms = delay.as_millis() as u64,
                    remaining = ?state.remaining(),
                    "Rate limit nearly exhausted, waiting for reset"
                );
                sleep(delay).await;
                state.reset_elapsed();
            }
            Decision::Proceed { delay } => {
                if !delay.is_zero() {
                    sleep(delay).await;
                }
            }
        }

        debug!(url = %url, operation, "Making GitHub API request");
        state.record_request(Instant::now());

        let response = self.client.get(&url).send().await.map_err(|e| RepoLensError::Network {
            message: format!("Failed to make request to GitHub API: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("github_client").with_operation(operation),
        })?;

        let remaining = header_value::<u32>(&response, "x-ratelimit-remaining");
        let reset_at = header_value::<i64>(&response, "x-ratelimit-reset");
        state.update(remaining, reset_at);

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if is_rate_limit_rejection(status.as_u16(), &body) {
                state.enter_fallback("explicit rate-limit rejection");
            }
            return Err(Box::new(response_error(status.as_u16(), &url, &body, operation)));
        }
        drop(state);

        let body = response.text().await.map_err(|e| RepoLensError::Network {
            message: format!("Failed to read response body: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("github_client").with_operation(operation),
        })?;

        serde_json::from_str(&body).map_err(|e| {
            Box::new(RepoLensError::Decode {
                message: format!("Unexpected response shape from {}: {}", url, e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("github_client").with_operation(operation),
            })
        })
    }

    fn contents_endpoint(repo: &RepoId, path: &str) -> String {
        let encoded: Vec<String> = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();

        if encoded.is_empty() {
            format!("repos/{}/{}/contents", repo.owner, repo.name)
        } else {
            format!("repos/{}/{}/contents/{}", repo.owner, repo.name, encoded.join("/"))
        }
    }

    /// Fetch and decode a single file; `None` when it is missing or undecodable
    async fn fetch_text(&self, repo: &RepoId, path: &str, operation: &str) -> RepoLensResult<Option<String>> {
        let file: GitHubContent = self
            .get_json(&Self::contents_endpoint(repo, path), operation)
            .await?;

        let Some(content) = file.content.filter(|_| file.kind == EntryKind::File) else {
            return Ok(None);
        };
        if file.encoding.as_deref().is_some_and(|enc| enc != "base64") {
            debug!(path, encoding = ?file.encoding, "Unexpected content encoding");
            return Ok(None);
        }

        let bytes = decode_base64_content(&content)?;
        Ok(decode_text(&bytes, &self.encodings))
    }

    async fn list_directory(&self, repo: &RepoId, path: &str) -> RepoLensResult<Vec<GitHubContent>> {
        self.get_json(&Self::contents_endpoint(repo, path), "list_directory")
            .await
    }

    async fn repository_from_clone(&self, repo: &RepoId) -> Fetched<RepositoryMetadata> {
        match self.fallback.repository_info(repo).await {
            Ok(metadata) => Fetched::Fallback(metadata),
            Err(err) => {
                err.log();
                Fetched::Empty
            }
        }
    }

    async fn activity_from_clone(&self, repo: &RepoId) -> Fetched<CommitActivity> {
        match self.fallback.commit_activity(repo).await {
            Ok(activity) => Fetched::Fallback(activity),
            Err(err) => {
                err.log();
                Fetched::Empty
            }
        }
    }
}

fn header_value<T: std::str::FromStr>(response: &reqwest::Response, name: &str) -> Option<T> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

fn log_unavailable(repo: &RepoId, operation: &str, err: &RepoLensError) {
    debug!(repo = %repo, operation, error = %err, "API data unavailable");
}

#[async_trait]
impl<F: LocalFallback> RepositorySource for GitHubClient<F> {
    async fn get_repository(&self, repo: &RepoId) -> Fetched<RepositoryMetadata> {
        let endpoint = format!("repos/{}/{}", repo.owner, repo.name);
        match self.get_json::<GitHubRepository>(&endpoint, "get_repository").await {
            Ok(dto) => Fetched::Api(RepositoryMetadata {
                id: repo.clone(),
                description: dto.description,
                stars: dto.stargazers_count.unwrap_or(0),
                forks: dto.forks_count.unwrap_or(0),
                watchers: dto.watchers_count.unwrap_or(0),
                open_issues: dto.open_issues_count.unwrap_or(0),
                language: dto.language,
                clone_url: dto.clone_url,
                homepage: dto.homepage.filter(|h| !h.is_empty()),
                provenance: Provenance::Api,
                clone_stats: None,
            }),
            Err(err) => {
                log_unavailable(repo, "get_repository", &err);
                self.repository_from_clone(repo).await
            }
        }
    }

    async fn get_readme(&self, repo: &RepoId) -> Fetched<String> {
        for candidate in &self.config.readme_candidates {
            match self.fetch_text(repo, candidate, "get_readme").await {
                Ok(Some(text)) => {
                    debug!(repo = %repo, file = %candidate, "Found README");
                    return Fetched::Api(text);
                }
                Ok(None) => continue,
                Err(err) => {
                    if matches!(*err, RepoLensError::RateLimit { .. }) {
                        break;
                    }
                    continue;
                }
            }
        }
        debug!(repo = %repo, "No README found");
        Fetched::Empty
    }

    async fn get_repository_contents(&self, repo: &RepoId) -> Fetched<Vec<ContentEntry>> {
        let root = match self.list_directory(repo, "").await {
            Ok(items) => items,
            Err(err) => {
                log_unavailable(repo, "get_repository_contents", &err);
                return Fetched::Empty;
            }
        };

        // Depth-first: a directory's entries replace it in place, before its later siblings
        let mut entries = Vec::new();
        let mut stack: Vec<VecDeque<GitHubContent>> = vec![root.into()];
        while let Some(level) = stack.last_mut() {
            let Some(item) = level.pop_front() else {
                stack.pop();
                continue;
            };

            match item.kind {
                EntryKind::Dir => match self.list_directory(repo, &item.path).await {
                    Ok(children) => stack.push(children.into()),
                    Err(err) => debug!(repo = %repo, path = %item.path, error = %err, "Skipping unreadable directory"),
                },
                EntryKind::File => entries.push(ContentEntry {
                    path: item.path,
                    kind: item.kind,
                    size: item.size,
                }),
                // Symlinks and submodules carry no file content
                EntryKind::Other => debug!(repo = %repo, path = %item.path, "Skipping non-file entry"),
            }
        }

        debug!(repo = %repo, entries = entries.len(), "Flattened repository contents");
        Fetched::Api(entries)
    }

    async fn get_file_content(&self, repo: &RepoId, path: &str) -> Fetched<String> {
        if is_binary_path(path) {
            debug!(path, "Skipping binary file");
            return Fetched::Empty;
        }

        match self.fetch_text(repo, path, "get_file_content").await {
            Ok(Some(text)) => Fetched::Api(text),
            Ok(None) => {
                debug!(path, "File content could not be decoded");
                Fetched::Empty
            }
            Err(err) => {
                log_unavailable(repo, "get_file_content", &err);
                Fetched::Empty
            }
        }
    }

    async fn get_contributors(&self, repo: &RepoId) -> Fetched<Vec<ContributorRecord>> {
        let endpoint = format!("repos/{}/{}/contributors?per_page=100", repo.owner, repo.name);
        match self.get_json::<Vec<GitHubContributor>>(&endpoint, "get_contributors").await {
            Ok(items) => Fetched::Api(
                items
                    .into_iter()
                    .map(|c| ContributorRecord {
                        login: c.login.unwrap_or_default(),
                        contributions: c.contributions.unwrap_or(0),
                    })
                    .collect(),
            ),
            Err(err) => {
                log_unavailable(repo, "get_contributors", &err);
                Fetched::Empty
            }
        }
    }

    async fn get_issues(&self, repo: &RepoId) -> Fetched<Vec<IssueRecord>> {
        let endpoint = format!("repos/{}/{}/issues?state=all&per_page=100", repo.owner, repo.name);
        match self.get_json::<Vec<GitHubIssue>>(&endpoint, "get_issues").await {
            Ok(items) => Fetched::Api(
                items
                    .into_iter()
                    .map(|i| IssueRecord {
                        title: i.title.unwrap_or_default(),
                        state: i.state.unwrap_or(IssueState::Other),
                        created_at: i.created_at,
                    })
                    .collect(),
            ),
            Err(err) => {
                log_unavailable(repo, "get_issues", &err);
                Fetched::Empty
            }
        }
    }

    async fn get_commit_activity(&self, repo: &RepoId) -> Fetched<CommitActivity> {
        let endpoint = format!("repos/{}/{}/stats/commit_activity", repo.owner, repo.name);
        match self.get_json::<Vec<GitHubWeek>>(&endpoint, "get_commit_activity").await {
            Ok(weeks) => {
                let weeks = weeks
                    .into_iter()
                    .map(|w| {
                        let mut days = [0u64; 7];
                        for (slot, count) in days.iter_mut().zip(w.days.unwrap_or_default()) {
                            *slot = count.unwrap_or(0);
                        }
                        WeekActivity::new(w.week.unwrap_or(0), w.total.unwrap_or(0), days)
                    })
                    .collect();
                Fetched::Api(CommitActivity::new(weeks, Provenance::Api))
            }
            Err(err) => {
                log_unavailable(repo, "get_commit_activity", &err);
                self.activity_from_clone(repo).await
            }
        }
    }

    async fn get_languages(&self, repo: &RepoId) -> Fetched<BTreeMap<String, u64>> {
        let endpoint = format!("repos/{}/{}/languages", repo.owner, repo.name);
        match self.get_json::<BTreeMap<String, u64>>(&endpoint, "get_languages").await {
            Ok(languages) => Fetched::Api(languages),
            Err(err) => {
                log_unavailable(repo, "get_languages", &err);
                Fetched::Empty
            }
        }
    }
}
