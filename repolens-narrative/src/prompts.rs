//! Prompt templates
//!
//! One template per artifact. Structured inputs are rendered as plain lists,
//! with JSON for the collections so the model sees exact names.

use crate::generator::ReadmeInput;
use crate::profile::ProjectProfile;
use repolens_core::{IssueRecord, IssueState};
use serde::Serialize;

/// Opening of the README prompt
pub const README_PREAMBLE: &str =
    "You are a technical documentation expert. Generate a comprehensive README.md file for the GitHub repository";

/// Formatting rules appended to the README prompt
pub const README_FORMATTING_RULES: &str = r#"
IMPORTANT FORMATTING RULES:
1. Separate each section with a blank line
2. Use proper markdown headers (# for main title, ## for sections, ### for subsections)
3. Indent lists consistently
4. Fence code blocks with ```
5. Align tables with |
6. Put badges on the lines directly under the title
7. Put each feature or point on its own line
8. Format every link as [text](url)
"#;

fn json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

fn or_default<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    value.filter(|v| !v.is_empty()).unwrap_or(default)
}

pub fn readme_prompt(input: &ReadmeInput<'_>, profile: &ProjectProfile) -> String {
    let metadata = input.metadata;
    let summary = input.summary;
    let stats = &input.stats;

    let sections = profile
        .readme_sections()
        .iter()
        .enumerate()
        .map(|(i, section)| format!("{}. {}", i + 1, section))
        .collect::<Vec<_>>()
        .join("\n");

    let existing = match input.existing_readme {
        Some(readme) if !readme.trim().is_empty() => readme,
        _ => "No existing README found",
    };

    format!(
        r#"{preamble} '{name}'.

Repository Information:
- Description: {description}
- Stars: {stars}
- Forks: {forks}
- Language: {language}
- Clone URL: {clone_url}
- Homepage: {homepage}

Code Analysis:
- Total Files: {total_files}
- Languages Used: {languages}
- Main Files: {main_files}
- Dependencies: {dependencies}
- Architecture Patterns: {architecture}

Repository Statistics:
- Contributors: {contributors}
- Issues: {issues}
- Commits (last year): {commits} across {weeks} weeks

Project Characteristics:
- Type: {kind}
- Complexity: {complexity}
- Tech Stack: {tech_stack}

Existing README Content (if any):
{existing}

Generate a README that includes:
{sections}
{rules}"#,
        preamble = README_PREAMBLE,
        name = metadata.id.name,
        description = or_default(metadata.description.as_deref(), "No description provided"),
        stars = metadata.stars,
        forks = metadata.forks,
        language = or_default(metadata.language.as_deref(), "Unknown"),
        clone_url = metadata.clone_url_or_default(),
        homepage = or_default(metadata.homepage.as_deref(), ""),
        total_files = summary.total_files,
        languages = json(&summary.languages),
        main_files = json(&summary.main_files),
        dependencies = json(&summary.dependencies),
        architecture = json(&summary.architecture),
        contributors = stats.contributors,
        issues = stats.issues,
        commits = stats.total_commits,
        weeks = stats.weeks,
        kind = profile.kind,
        complexity = profile.complexity,
        tech_stack = json(&profile.tech_stack),
        existing = existing,
        sections = sections,
        rules = README_FORMATTING_RULES,
    )
}

pub fn contribution_prompt(
    name: &str,
    language: Option<&str>,
    active_contributors: usize,
    open_issues: usize,
) -> String {
    format!(
        r#"Generate contribution guidelines for this repository:
Name: {}
Language: {}
Active Contributors: {}
Open Issues: {}

Please include:
1. Setup instructions
2. Code style guidelines
3. Pull request process
4. Testing requirements
5. Documentation standards"#,
        name,
        or_default(language, "Unknown"),
        active_contributors,
        open_issues
    )
}

pub(crate) fn state_label(state: IssueState) -> &'static str {
    match state {
        IssueState::Open => "open",
        IssueState::Closed => "closed",
        IssueState::Other => "unknown",
    }
}

pub fn issues_prompt(issues: &[IssueRecord]) -> String {
    let listing = issues
        .iter()
        .map(|issue| format!("- {} ({})", issue.title, state_label(issue.state)))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Analyze the following GitHub issues and provide insights on:
1. Common Themes and Patterns
2. Priority Areas for Improvement
3. Project Health Indicators
4. Suggested Action Items

Issues:
{}

Please provide a detailed analysis focusing on these aspects."#,
        listing
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::RepositoryStats;
    use repolens_core::{CodeAnalysisSummary, RepoId, RepositoryMetadata};

    #[test]
    fn test_readme_prompt_carries_structured_inputs() {
        let mut metadata = RepositoryMetadata::unknown(RepoId::new("acme", "rocket"));
        metadata.stars = 42;
        let mut summary = CodeAnalysisSummary::default();
        summary.languages.increment("Rust");
        summary.dependencies.insert("tokio".to_string());

        let input = ReadmeInput {
            metadata: &metadata,
            existing_readme: None,
            summary: &summary,
            stats: RepositoryStats {
                contributors: 3,
                issues: 4,
                total_commits: 15,
                weeks: 2,
            },
        };
        let profile = ProjectProfile::from_summary(&summary);
        let prompt = readme_prompt(&input, &profile);

        assert!(prompt.contains("'rocket'"));
        assert!(prompt.contains("- Stars: 42"));
        assert!(prompt.contains("- Description: No description provided"));
        assert!(prompt.contains(r#"- Languages Used: {"Rust":1}"#));
        assert!(prompt.contains(r#"- Dependencies: ["tokio"]"#));
        assert!(prompt.contains("https://github.com/acme/rocket.git"));
        assert!(prompt.contains("No existing README found"));
        assert!(prompt.contains("1. Project Title and Description"));
        assert!(prompt.contains("- Type: general_software"));
    }

    #[test]
    fn test_issues_prompt_lists_each_issue() {
        let issues = [
            IssueRecord {
                title: "Crash on start".to_string(),
                state: IssueState::Open,
                created_at: None,
            },
            IssueRecord {
                title: "Typo".to_string(),
                state: IssueState::Closed,
                created_at: None,
            },
        ];
        let prompt = issues_prompt(&issues);
        assert!(prompt.contains("- Crash on start (open)\n- Typo (closed)"));
    }

    #[test]
    fn test_contribution_prompt_defaults_language() {
        let prompt = contribution_prompt("rocket", None, 1, 2);
        assert!(prompt.contains("Language: Unknown"));
        assert!(prompt.contains("Active Contributors: 1"));
        assert!(prompt.contains("Open Issues: 2"));
    }
}
