//! Code feedback heuristics
//!
//! Fixed-threshold suggestions over listings, summaries and metrics.

use crate::languages::extension;
use crate::metrics::ReadmeQuality;
use repolens_core::{CodeAnalysisSummary, ContentEntry, RepositoryMetrics};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const CONFIG_MARKERS: &[&str] = &[
    "config",
    "settings",
    "env",
    ".env",
    "config.json",
    "config.yml",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOrganization {
    pub suggestions: Vec<String>,
    /// Extension -> file count
    pub file_types: BTreeMap<String, usize>,
}

pub fn file_organization(entries: &[ContentEntry]) -> FileOrganization {
    let mut file_types = BTreeMap::new();
    for entry in entries.iter().filter(|e| e.is_file()) {
        if entry.path.contains('.') {
            *file_types.entry(extension(&entry.path)).or_insert(0) += 1;
        }
    }

    let mut suggestions = Vec::new();
    if file_types.len() > 10 {
        suggestions.push(
            "Consider organizing files into logical directories based on their types".to_string(),
        );
    }

    let lowered: Vec<String> = entries
        .iter()
        .filter(|e| e.is_file())
        .map(|e| e.path.to_lowercase())
        .collect();

    if !lowered
        .iter()
        .any(|path| CONFIG_MARKERS.iter().any(|marker| path.contains(marker)))
    {
        suggestions.push("Consider adding configuration files for better project setup".to_string());
    }
    if !lowered.iter().any(|path| path.contains("test")) {
        suggestions.push("Consider adding test files for better code quality".to_string());
    }

    FileOrganization {
        suggestions,
        file_types,
    }
}

pub fn performance_suggestions(summary: &CodeAnalysisSummary) -> Vec<String> {
    let mut suggestions = Vec::new();

    if summary.total_files > 100 {
        suggestions.push("Consider implementing lazy loading for large files".to_string());
    }
    if summary.dependencies.len() > 20 {
        suggestions.push("Review and optimize dependencies to reduce bundle size".to_string());
    }
    if summary
        .architecture
        .iter()
        .any(|label| label.to_lowercase().contains("async"))
    {
        suggestions.push("Consider implementing caching for async operations".to_string());
    }

    suggestions
}

pub fn security_suggestions(summary: &CodeAnalysisSummary) -> Vec<String> {
    let mut suggestions = Vec::new();
    let depends_on = |needle: &str| {
        summary
            .dependencies
            .iter()
            .any(|dep| dep.to_lowercase().contains(needle))
    };

    if depends_on("api") {
        suggestions.push("Implement API key validation and rate limiting".to_string());
    }
    if depends_on("database") {
        suggestions.push("Implement input validation and SQL injection prevention".to_string());
    }
    if summary
        .architecture
        .iter()
        .any(|label| label.to_lowercase().contains("web"))
    {
        suggestions.push("Implement CORS and security headers".to_string());
    }

    suggestions
}

pub fn improvement_areas(metrics: &RepositoryMetrics, readme: &ReadmeQuality) -> Vec<String> {
    let mut areas = Vec::new();

    if metrics.open_issues > 10 {
        areas.push("High number of open issues".to_string());
    }
    if metrics.issue_response_time.days > 7 {
        areas.push("Slow issue response time".to_string());
    }
    if metrics.active_contributors < 3 {
        areas.push("Limited active contributors".to_string());
    }
    if readme.score < 50 {
        areas.push("Documentation needs improvement".to_string());
    }

    areas
}

pub fn best_practices(metrics: &RepositoryMetrics, readme: &ReadmeQuality) -> Vec<String> {
    let mut practices = Vec::new();

    if metrics.active_contributors < 3 {
        practices.push("Encourage more community contributions".to_string());
    }
    if readme.score < 50 {
        practices.push("Improve documentation with examples and API references".to_string());
    }
    if metrics.issue_response_time.days > 7 {
        practices.push("Implement faster issue response process".to_string());
    }

    practices
}
