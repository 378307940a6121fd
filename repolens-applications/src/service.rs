//! Analysis service
//!
//! Every workflow fetches through the [`RepositorySource`], so missing data
//! shows up as empty fields rather than errors. Only README generation and
//! code feedback refuse to run without repository metadata.

use crate::reports::*;
use crate::{ApplicationError, ApplicationResult};
use chrono::{DateTime, Utc};
use repolens_analysis::{
    best_practices, calculate_metrics, code_quality, commit_frequency, file_organization,
    improvement_areas, maintenance_score, performance_suggestions, readme_quality,
    security_suggestions, ContentAnalyzer,
};
use repolens_core::{
    log_operation_start, log_operation_success, performance, AnalysisConfig, AnalysisResult,
    CodeAnalysisSummary, CommitActivity, RepoId, RepoLensConfig, RepositoryMetadata,
    RepositorySource, TextGenerator,
};
use repolens_narrative::{GeminiClient, NarrativeGenerator, ReadmeInput, RepositoryStats};
use repolens_repo::GitHubClient;
use tracing::{debug, warn};

/// Service wired to the GitHub API and Gemini
pub type GitHubAnalysisService = AnalysisService<GitHubClient, GeminiClient>;

pub struct AnalysisService<S, G> {
    source: S,
    narrative: NarrativeGenerator<G>,
    analyzer: ContentAnalyzer,
    clock: fn() -> DateTime<Utc>,
}

impl GitHubAnalysisService {
    /// Service backed by the GitHub API and Gemini.
    ///
    /// Fails when the Gemini key is missing; a missing GitHub token only
    /// degrades the client to its clone fallback.
    pub fn from_config(config: &RepoLensConfig) -> ApplicationResult<Self> {
        let source = GitHubClient::new(config.github.clone())?;
        let generator = GeminiClient::new(config.llm.clone())?;
        Ok(Self::new(source, generator, &config.analysis))
    }
}

impl<S, G> AnalysisService<S, G>
where
    S: RepositorySource,
    G: TextGenerator,
{
    pub fn new(source: S, generator: G, config: &AnalysisConfig) -> Self {
        Self {
            source,
            narrative: NarrativeGenerator::new(generator),
            analyzer: ContentAnalyzer::new(config),
            clock: Utc::now,
        }
    }

    /// Replace the wall clock used for issue ages
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    async fn analyze_code(&self, id: &RepoId) -> CodeAnalysisSummary {
        let entries = self.source.get_repository_contents(id).await.unwrap_or_default();
        self.analyzer.analyze(&self.source, id, &entries).await
    }

    fn stats(
        contributors: usize,
        issues: usize,
        activity: Option<&CommitActivity>,
    ) -> RepositoryStats {
        RepositoryStats {
            contributors,
            issues,
            total_commits: activity.map(CommitActivity::total_commits).unwrap_or(0),
            weeks: activity.map(|a| a.weeks.len()).unwrap_or(0),
        }
    }

    pub async fn get_full_analysis(&self, owner: &str, repo: &str) -> AnalysisResult {
        let id = RepoId::new(owner, repo);
        log_operation_start!("full_analysis", repo = %id);

        performance::measure_async("full_analysis", self.full_analysis(id)).await
    }

    async fn full_analysis(&self, id: RepoId) -> AnalysisResult {
        let repository = self.source.get_repository(&id).await.into_option();
        if repository.is_none() {
            warn!(repo = %id, "Repository metadata unavailable; continuing with partial data");
        }

        let contributors = self.source.get_contributors(&id).await.unwrap_or_default();
        let commit_activity = self.source.get_commit_activity(&id).await.into_option();
        let issues = self.source.get_issues(&id).await.unwrap_or_default();
        let issue_insight = self.narrative.analyze_issues(&issues).await;
        let existing_readme = self.source.get_readme(&id).await.into_option();
        let code_analysis = self.analyze_code(&id).await;
        let language_bytes = self.source.get_languages(&id).await.unwrap_or_default();

        let metrics = calculate_metrics(
            &contributors,
            &issues,
            code_analysis.total_code,
            (self.clock)(),
        );
        let commit_frequency = commit_activity
            .as_ref()
            .map(commit_frequency)
            .unwrap_or_default();

        let placeholder = RepositoryMetadata::unknown(id.clone());
        let readme = self
            .narrative
            .generate_readme(&ReadmeInput {
                metadata: repository.as_ref().unwrap_or(&placeholder),
                existing_readme: existing_readme.as_deref(),
                summary: &code_analysis,
                stats: Self::stats(contributors.len(), issues.len(), commit_activity.as_ref()),
            })
            .await;

        log_operation_success!(
            "full_analysis",
            repo = %id,
            files = code_analysis.total_files,
            contributors = contributors.len(),
            issues = issues.len()
        );

        AnalysisResult {
            id,
            repository,
            contributors,
            commit_activity,
            commit_frequency,
            issues,
            issue_insight,
            code_analysis,
            language_bytes,
            readme,
            metrics,
        }
    }

    pub async fn get_developer_analysis(&self, owner: &str, repo: &str) -> DeveloperAnalysis {
        let analysis = self.get_full_analysis(owner, repo).await;

        let language = analysis
            .repository
            .as_ref()
            .and_then(|r| r.language.as_deref());
        let contribution_guidelines = self
            .narrative
            .generate_contribution_guidelines(
                &analysis.id.name,
                language,
                analysis.metrics.active_contributors,
                analysis.metrics.open_issues,
            )
            .await;

        let developer_metrics = DeveloperMetrics {
            code_quality: code_quality(&analysis.code_analysis),
            maintenance_score: maintenance_score(&analysis.metrics),
            contribution_guidelines,
        };

        DeveloperAnalysis {
            analysis,
            developer_metrics,
        }
    }

    async fn require_repository(&self, id: &RepoId) -> ApplicationResult<RepositoryMetadata> {
        self.source.get_repository(id).await.into_option().ok_or_else(|| {
            ApplicationError::not_found(format!("Failed to fetch repository data for {}", id))
        })
    }

    pub async fn generate_readme(&self, owner: &str, repo: &str) -> ApplicationResult<ReadmeReport> {
        let id = RepoId::new(owner, repo);
        log_operation_start!("generate_readme", repo = %id);

        let repository = self.require_repository(&id).await?;
        let existing_readme = self.source.get_readme(&id).await.into_option();
        let code_analysis = self.analyze_code(&id).await;

        let contributors = self.source.get_contributors(&id).await.unwrap_or_default();
        let issues = self.source.get_issues(&id).await.unwrap_or_default();
        let activity = self.source.get_commit_activity(&id).await.into_option();
        let stats = Self::stats(contributors.len(), issues.len(), activity.as_ref());

        let readme = self
            .narrative
            .generate_readme(&ReadmeInput {
                metadata: &repository,
                existing_readme: existing_readme.as_deref(),
                summary: &code_analysis,
                stats,
            })
            .await;

        log_operation_success!("generate_readme", repo = %id, fallback = readme.is_fallback());

        Ok(ReadmeReport {
            readme,
            repository,
            code_analysis,
            stats,
        })
    }

    pub async fn get_code_feedback(&self, owner: &str, repo: &str) -> ApplicationResult<CodeFeedback> {
        let id = RepoId::new(owner, repo);
        log_operation_start!("code_feedback", repo = %id);

        let repository = self.require_repository(&id).await?;
        let entries = self
            .source
            .get_repository_contents(&id)
            .await
            .into_option()
            .filter(|entries| !entries.is_empty())
            .ok_or_else(|| {
                ApplicationError::unavailable(format!("Failed to fetch repository contents for {}", id))
            })?;

        let readme = self.source.get_readme(&id).await.into_option();
        let code_analysis = self.analyzer.analyze(&self.source, &id, &entries).await;

        let contributors = self.source.get_contributors(&id).await.unwrap_or_default();
        let issues = self.source.get_issues(&id).await.unwrap_or_default();
        let metrics = calculate_metrics(
            &contributors,
            &issues,
            code_analysis.total_code,
            (self.clock)(),
        );
        debug!(repo = %id, ?metrics, "Feedback metrics");

        let quality = code_quality(&code_analysis);
        let organization = file_organization(&entries);
        let documentation = readme_quality(readme.as_deref());

        let feedback = CodeFeedback {
            name: repository.id.name.clone(),
            scores: FeedbackScores {
                code_quality: quality.quality_score,
                maintenance: maintenance_score(&metrics),
                documentation: documentation.score,
            },
            structure: organization.suggestions,
            quality: improvement_areas(&metrics, &documentation),
            best_practices: best_practices(&metrics, &documentation),
            documentation: documentation.suggestions,
            performance: performance_suggestions(&code_analysis),
            security: security_suggestions(&code_analysis),
        };

        log_operation_success!("code_feedback", repo = %id);
        Ok(feedback)
    }
}
