//! Report types returned by [`crate::AnalysisService`]

use repolens_analysis::CodeQuality;
use repolens_core::{AnalysisResult, CodeAnalysisSummary, Narrative, RepositoryMetadata};
use repolens_narrative::RepositoryStats;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeveloperMetrics {
    pub code_quality: CodeQuality,
    pub maintenance_score: u32,
    pub contribution_guidelines: Narrative,
}

/// Full analysis plus developer-focused metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeveloperAnalysis {
    #[serde(flatten)]
    pub analysis: AnalysisResult,
    pub developer_metrics: DeveloperMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadmeReport {
    pub readme: Narrative,
    pub repository: RepositoryMetadata,
    pub code_analysis: CodeAnalysisSummary,
    pub stats: RepositoryStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackScores {
    pub code_quality: u32,
    pub maintenance: u32,
    pub documentation: u32,
}

/// Scores and suggestions for improving a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeFeedback {
    pub name: String,
    pub scores: FeedbackScores,
    /// File-organization suggestions
    pub structure: Vec<String>,
    /// Improvement areas
    pub quality: Vec<String>,
    /// README suggestions
    pub documentation: Vec<String>,
    pub best_practices: Vec<String>,
    pub performance: Vec<String>,
    pub security: Vec<String>,
}
