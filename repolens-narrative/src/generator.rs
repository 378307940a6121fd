//! Narrative generator
//!
//! Wraps a [`TextGenerator`] and guarantees a usable [`Narrative`] for every
//! artifact: model output when the call succeeds, the deterministic fallback
//! otherwise.

use crate::fallback::{fallback_contribution_guidelines, fallback_issue_insight, fallback_readme};
use crate::profile::ProjectProfile;
use crate::prompts::{contribution_prompt, issues_prompt, readme_prompt};
use repolens_core::{
    CodeAnalysisSummary, IssueInsight, IssueRecord, IssueState, Narrative, RepositoryMetadata,
    TextGenerator,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Prefix marking generated text as an error report rather than content
pub const ERROR_SENTINEL: &str = "Error:";

/// Aggregate repository statistics handed to the README prompt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryStats {
    pub contributors: usize,
    pub issues: usize,
    pub total_commits: u64,
    pub weeks: usize,
}

/// Everything the README artifact is built from
#[derive(Debug, Clone)]
pub struct ReadmeInput<'a> {
    pub metadata: &'a RepositoryMetadata,
    pub existing_readme: Option<&'a str>,
    pub summary: &'a CodeAnalysisSummary,
    pub stats: RepositoryStats,
}

pub struct NarrativeGenerator<G> {
    generator: G,
}

impl<G: TextGenerator> NarrativeGenerator<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Model text, or `None` when the call failed or answered with an error report
    async fn complete(&self, prompt: &str, artifact: &str) -> Option<String> {
        match self.generator.generate(prompt).await {
            Ok(text) if text.trim().is_empty() => {
                warn!(artifact, generator = self.generator.name(), "Empty generation, using fallback");
                None
            }
            Ok(text) if text.trim_start().starts_with(ERROR_SENTINEL) => {
                warn!(artifact, generator = self.generator.name(), "Generator reported an error, using fallback");
                None
            }
            Ok(text) => {
                debug!(artifact, chars = text.len(), "Generated narrative");
                Some(text)
            }
            Err(e) => {
                warn!(artifact, generator = self.generator.name(), error = %e, "Generation failed, using fallback");
                None
            }
        }
    }

    pub async fn generate_readme(&self, input: &ReadmeInput<'_>) -> Narrative {
        let profile = ProjectProfile::from_summary(input.summary);
        let prompt = readme_prompt(input, &profile);

        match self.complete(&prompt, "readme").await {
            Some(text) => Narrative::model(text),
            None => Narrative::fallback(fallback_readme(input.metadata, input.summary)),
        }
    }

    pub async fn generate_contribution_guidelines(
        &self,
        name: &str,
        language: Option<&str>,
        active_contributors: usize,
        open_issues: usize,
    ) -> Narrative {
        let prompt = contribution_prompt(name, language, active_contributors, open_issues);

        match self.complete(&prompt, "contribution_guidelines").await {
            Some(text) => Narrative::model(text),
            None => Narrative::fallback(fallback_contribution_guidelines(name, language)),
        }
    }

    /// Issue counts plus insight prose. No call is made when there are no issues.
    pub async fn analyze_issues(&self, issues: &[IssueRecord]) -> IssueInsight {
        let open = issues.iter().filter(|i| i.state == IssueState::Open).count();
        let closed = issues.iter().filter(|i| i.state == IssueState::Closed).count();

        let narrative = if issues.is_empty() {
            Narrative::fallback(fallback_issue_insight(issues))
        } else {
            match self.complete(&issues_prompt(issues), "issue_insight").await {
                Some(text) => Narrative::model(text),
                None => Narrative::fallback(fallback_issue_insight(issues)),
            }
        };

        IssueInsight {
            open,
            closed,
            narrative,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use repolens_core::{
        ErrorContext, NarrativeSource, RepoId, RepoLensError, RepoLensResult,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Reply {
        Text(&'static str),
        Fail,
    }

    struct ScriptedGenerator {
        reply: Reply,
        calls: AtomicUsize,
    }

    impl ScriptedGenerator {
        fn new(reply: Reply) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, _prompt: &str) -> RepoLensResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Reply::Text(text) => Ok(text.to_string()),
                Reply::Fail => Err(Box::new(RepoLensError::Llm {
                    message: "boom".to_string(),
                    provider: None,
                    model: None,
                    context: ErrorContext::new("test"),
                })),
            }
        }
    }

    fn metadata() -> RepositoryMetadata {
        RepositoryMetadata::unknown(RepoId::new("acme", "rocket"))
    }

    async fn readme_with(reply: Reply) -> Narrative {
        let metadata = metadata();
        let summary = CodeAnalysisSummary::default();
        let generator = NarrativeGenerator::new(ScriptedGenerator::new(reply));
        generator
            .generate_readme(&ReadmeInput {
                metadata: &metadata,
                existing_readme: Some("# old"),
                summary: &summary,
                stats: RepositoryStats::default(),
            })
            .await
    }

    #[tokio::test]
    async fn test_model_text_is_used() {
        let readme = readme_with(Reply::Text("# Rocket\n\nGenerated.")).await;
        assert_eq!(readme, Narrative::model("# Rocket\n\nGenerated."));
    }

    #[tokio::test]
    async fn test_failure_yields_fallback() {
        let readme = readme_with(Reply::Fail).await;
        assert_eq!(readme.source, NarrativeSource::Fallback);
        assert!(readme.text.contains("# rocket"));
        assert!(readme.text.contains("https://github.com/acme/rocket.git"));
    }

    #[tokio::test]
    async fn test_sentinel_and_empty_text_yield_fallback() {
        for reply in ["Error: Unable to generate content.", "   "] {
            let readme = readme_with(Reply::Text(reply)).await;
            assert!(readme.is_fallback(), "{reply:?} should fall back");
        }
    }

    #[tokio::test]
    async fn test_analyze_issues_counts_and_skips_call_when_empty() {
        let generator = NarrativeGenerator::new(ScriptedGenerator::new(Reply::Text("insight")));

        let empty = generator.analyze_issues(&[]).await;
        assert_eq!((empty.open, empty.closed), (0, 0));
        assert!(empty.narrative.is_fallback());
        assert_eq!(generator.generator().calls.load(Ordering::SeqCst), 0);

        let issues = vec![
            IssueRecord {
                title: "a".to_string(),
                state: IssueState::Open,
                created_at: None,
            },
            IssueRecord {
                title: "b".to_string(),
                state: IssueState::Closed,
                created_at: None,
            },
        ];
        let insight = generator.analyze_issues(&issues).await;
        assert_eq!((insight.open, insight.closed), (1, 1));
        assert_eq!(insight.narrative, Narrative::model("insight"));
    }

    #[tokio::test]
    async fn test_contribution_guidelines_fallback() {
        let generator = NarrativeGenerator::new(ScriptedGenerator::new(Reply::Fail));
        let guidelines = generator
            .generate_contribution_guidelines("rocket", Some("Rust"), 1, 2)
            .await;
        assert!(guidelines.is_fallback());
        assert!(guidelines.text.contains("Contributing to rocket"));
    }
}
