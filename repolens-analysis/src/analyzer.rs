//! Content analyzer
//!
//! Walks a flattened listing, fetches each file's text through the
//! [`RepositorySource`] and folds the per-file findings into a
//! [`CodeAnalysisSummary`].

use crate::languages::detect_language;
use crate::rules::RuleRegistry;
use repolens_core::{
    AnalysisConfig, CodeAnalysisSummary, ComplexityTier, ContentEntry, FileComplexity,
    QualitativeAssessment, RepoId, RepositorySource,
};
use tracing::{debug, info};

/// Matched against the lower-cased path or the raw content
pub const MAIN_INDICATORS: &[&str] = &[
    "main",
    "app",
    "index",
    "server",
    "init",
    "if __name__ == \"__main__\"",
    "def main()",
    "public static void main",
    "fn main()",
];

pub fn is_main_file(path: &str, content: &str) -> bool {
    let lower_path = path.to_lowercase();
    MAIN_INDICATORS
        .iter()
        .any(|indicator| lower_path.contains(indicator) || content.contains(indicator))
}

/// Complexity tier from the classified-file count
pub fn complexity_tier(total_code: usize) -> ComplexityTier {
    if total_code > 50 {
        ComplexityTier::High
    } else if total_code > 10 {
        ComplexityTier::Medium
    } else {
        ComplexityTier::Low
    }
}

/// Incrementally builds a [`CodeAnalysisSummary`]
#[derive(Debug, Default)]
pub struct SummaryBuilder<'r> {
    summary: CodeAnalysisSummary,
    registry: Option<&'r RuleRegistry>,
}

impl<'r> SummaryBuilder<'r> {
    pub fn new(registry: &'r RuleRegistry) -> Self {
        Self {
            summary: CodeAnalysisSummary::default(),
            registry: Some(registry),
        }
    }

    /// Count an entry; only files count toward `total_files`
    pub fn add_entry(&mut self, entry: &ContentEntry) {
        if entry.is_file() {
            self.summary.total_files += 1;
        }
    }

    /// Fold in the text of one file. Empty content contributes nothing.
    pub fn add_content(&mut self, path: &str, content: &str) {
        if content.is_empty() {
            return;
        }

        let language = detect_language(path);
        if let Some(language) = language {
            self.summary.languages.increment(language);
        }

        let rules = language.and_then(|lang| self.registry.and_then(|r| r.get(lang)));

        if let Some(rules) = rules {
            self.summary
                .dependencies
                .extend(rules.detect_dependencies(content));
        }

        if is_main_file(path, content) {
            self.summary.main_files.push(path.to_string());
        }

        if let Some(rules) = rules {
            self.summary
                .architecture
                .extend(rules.detect_patterns(content).into_iter().map(String::from));
        }

        let (functions, classes) = rules.map(|r| r.count_constructs(content)).unwrap_or((0, 0));
        self.summary.complexity.insert(
            path.to_string(),
            FileComplexity {
                lines: content.lines().count(),
                functions,
                classes,
            },
        );
    }

    /// Derive totals and the qualitative assessment
    pub fn finish(mut self) -> CodeAnalysisSummary {
        let summary = &mut self.summary;
        if summary.languages.is_empty() {
            summary.total_code = 0;
            summary.most_used_language = None;
            summary.assessment = QualitativeAssessment::default();
            return self.summary;
        }

        summary.total_code = summary.languages.total();
        summary.most_used_language = summary.languages.most_used().map(str::to_string);
        summary.assessment = QualitativeAssessment {
            complexity: complexity_tier(summary.total_code),
            important_languages: summary.languages.names().take(3).map(String::from).collect(),
            technologies: summary.dependencies.iter().take(5).cloned().collect(),
            quality: vec![if summary.total_files > 5 {
                "Well-structured".to_string()
            } else {
                "Simple structure".to_string()
            }],
        };
        self.summary
    }
}

/// Produces code-analysis summaries from repository listings
#[derive(Debug, Default)]
pub struct ContentAnalyzer {
    registry: RuleRegistry,
    max_files: Option<usize>,
}

impl ContentAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self::with_registry(RuleRegistry::default(), config.max_files)
    }

    pub fn with_registry(registry: RuleRegistry, max_files: Option<usize>) -> Self {
        Self {
            registry,
            max_files,
        }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Analyze entries whose content is already known (`None` = not retrievable)
    pub fn analyze_files<'a, I>(&self, files: I) -> CodeAnalysisSummary
    where
        I: IntoIterator<Item = (&'a ContentEntry, Option<&'a str>)>,
    {
        let mut builder = SummaryBuilder::new(&self.registry);
        for (entry, content) in files {
            builder.add_entry(entry);
            match content {
                Some(content) if entry.is_file() => builder.add_content(&entry.path, content),
                _ => {}
            }
        }
        builder.finish()
    }

    /// Fetch file contents one by one and build the summary
    pub async fn analyze<S>(&self, source: &S, repo: &RepoId, entries: &[ContentEntry]) -> CodeAnalysisSummary
    where
        S: RepositorySource + ?Sized,
    {
        let mut builder = SummaryBuilder::new(&self.registry);
        let mut fetched = 0usize;

        for entry in entries {
            builder.add_entry(entry);
            if !entry.is_file() {
                continue;
            }
            if self.max_files.is_some_and(|max| fetched >= max) {
                continue;
            }
            fetched += 1;

            match source.get_file_content(repo, &entry.path).await.into_option() {
                Some(content) => builder.add_content(&entry.path, &content),
                None => debug!(path = %entry.path, "No content for file"),
            }
        }

        let summary = builder.finish();
        info!(
            repo = %repo,
            total_files = summary.total_files,
            fetched,
            languages = summary.languages.len(),
            dependencies = summary.dependencies.len(),
            "Code analysis completed"
        );
        summary
    }
}
