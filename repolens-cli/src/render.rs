//! Markdown rendering of reports

use repolens_applications::{CodeFeedback, DeveloperAnalysis};
use repolens_core::{AnalysisResult, RepoLensConfig, ResponseTimeBasis};
use std::fmt::Write;

const REDACTED: &str = "<redacted>";

/// Copy of the configuration with secrets masked
pub fn redacted(config: &RepoLensConfig) -> RepoLensConfig {
    let mut config = config.clone();
    if config.github.access_token.is_some() {
        config.github.access_token = Some(REDACTED.to_string());
    }
    if config.llm.api_key.is_some() {
        config.llm.api_key = Some(REDACTED.to_string());
    }
    config
}

fn bullets(out: &mut String, items: &[String], empty: &str) {
    if items.is_empty() {
        let _ = writeln!(out, "- {empty}");
    }
    for item in items {
        let _ = writeln!(out, "- {item}");
    }
}

pub fn analysis(result: &AnalysisResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", result.id);

    match &result.repository {
        Some(repo) => {
            if let Some(description) = &repo.description {
                let _ = writeln!(out, "{description}\n");
            }
            let _ = writeln!(
                out,
                "Stars: {} | Forks: {} | Watchers: {} | Language: {}\n",
                repo.stars,
                repo.forks,
                repo.watchers,
                repo.language.as_deref().unwrap_or("unknown")
            );
        }
        None => {
            let _ = writeln!(out, "_Repository metadata unavailable_\n");
        }
    }

    let metrics = &result.metrics;
    let response = match metrics.issue_response_time.basis {
        ResponseTimeBasis::Measured => format!("{} days", metrics.issue_response_time.days),
        ResponseTimeBasis::Placeholder => {
            format!("{} days (estimate)", metrics.issue_response_time.days)
        }
    };
    let _ = writeln!(out, "## Metrics\n");
    let _ = writeln!(out, "- Average contributions: {:.2}", metrics.avg_contributions);
    let _ = writeln!(out, "- Active contributors: {}", metrics.active_contributors);
    let _ = writeln!(out, "- Open issues: {}", metrics.open_issues);
    let _ = writeln!(out, "- Issue response time: {response}");
    let _ = writeln!(out, "- Classified files: {}\n", metrics.total_code);

    let frequency = &result.commit_frequency;
    let _ = writeln!(out, "## Commit activity\n");
    let _ = writeln!(
        out,
        "{} commits over {} weeks ({:.2}/week, {:.2}/day)\n",
        frequency.total_commits,
        frequency.total_weeks,
        frequency.weekly_average,
        frequency.daily_average
    );

    let code = &result.code_analysis;
    let _ = writeln!(out, "## Code\n");
    let _ = writeln!(
        out,
        "- Files: {} | Complexity: {}",
        code.total_files, code.assessment.complexity
    );
    for (language, count) in code.languages.iter() {
        let _ = writeln!(out, "- {language}: {count} files");
    }
    if !code.main_files.is_empty() {
        let _ = writeln!(out, "- Entry points: {}", code.main_files.join(", "));
    }
    out.push('\n');

    let _ = writeln!(
        out,
        "## Issues\n\n{} open, {} closed\n\n{}\n",
        result.issue_insight.open, result.issue_insight.closed, result.issue_insight.narrative.text
    );
    let _ = writeln!(out, "## Generated README\n\n{}", result.readme.text);
    out
}

pub fn developer(report: &DeveloperAnalysis) -> String {
    let mut out = analysis(&report.analysis);
    let metrics = &report.developer_metrics;

    let _ = writeln!(out, "\n## Developer metrics\n");
    let _ = writeln!(out, "- Maintenance score: {}/100", metrics.maintenance_score);
    let _ = writeln!(out, "- Code quality score: {}/100", metrics.code_quality.quality_score);
    let _ = writeln!(out, "- Language diversity: {}", metrics.code_quality.language_diversity);
    let _ = writeln!(
        out,
        "- Main language ratio: {:.2}\n",
        metrics.code_quality.main_language_ratio
    );
    let _ = writeln!(out, "{}", metrics.contribution_guidelines.text);
    out
}

pub fn feedback(report: &CodeFeedback) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Feedback for {}\n", report.name);
    let _ = writeln!(out, "| Area | Score |\n|---|---|");
    let _ = writeln!(out, "| Code quality | {} |", report.scores.code_quality);
    let _ = writeln!(out, "| Maintenance | {} |", report.scores.maintenance);
    let _ = writeln!(out, "| Documentation | {} |\n", report.scores.documentation);

    let sections: [(&str, &[String]); 6] = [
        ("Structure", &report.structure),
        ("Quality", &report.quality),
        ("Documentation", &report.documentation),
        ("Best practices", &report.best_practices),
        ("Performance", &report.performance),
        ("Security", &report.security),
    ];
    for (title, items) in sections {
        let _ = writeln!(out, "## {title}\n");
        bullets(&mut out, items, "No suggestions");
        out.push('\n');
    }
    out
}
