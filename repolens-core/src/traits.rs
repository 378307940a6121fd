//! Core trait definitions

use crate::error::RepoLensResult;
use crate::types::*;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Source of repository data.
///
/// Every operation degrades instead of failing: a missing repository, a non-2xx
/// response or a transport error yields [`Fetched::Empty`] (or a clone-derived
/// [`Fetched::Fallback`] where a local equivalent exists).
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// Repository metadata snapshot
    async fn get_repository(&self, repo: &RepoId) -> Fetched<RepositoryMetadata>;

    /// First decodable README among the conventional filenames
    async fn get_readme(&self, repo: &RepoId) -> Fetched<String>;

    /// Depth-first flattened listing of every entry in the repository
    async fn get_repository_contents(&self, repo: &RepoId) -> Fetched<Vec<ContentEntry>>;

    /// Decoded text of a single file; binary or undecodable files are empty
    async fn get_file_content(&self, repo: &RepoId, path: &str) -> Fetched<String>;

    async fn get_contributors(&self, repo: &RepoId) -> Fetched<Vec<ContributorRecord>>;

    async fn get_issues(&self, repo: &RepoId) -> Fetched<Vec<IssueRecord>>;

    /// Weekly commit activity for the last year
    async fn get_commit_activity(&self, repo: &RepoId) -> Fetched<CommitActivity>;

    /// Language name -> bytes of code
    async fn get_languages(&self, repo: &RepoId) -> Fetched<BTreeMap<String, u64>>;
}

/// External text-generation service
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Run a single prompt and return the generated text
    async fn generate(&self, prompt: &str) -> RepoLensResult<String>;

    /// Name used in logs
    fn name(&self) -> &str {
        "text-generator"
    }
}
