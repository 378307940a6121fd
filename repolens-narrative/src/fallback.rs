//! Deterministic Markdown documents used when generation fails
//!
//! Built only from structured inputs; never from partial model output.

use crate::prompts::state_label;
use repolens_core::{CodeAnalysisSummary, IssueRecord, IssueState, RepositoryMetadata};

fn join_or(items: Vec<&str>, empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

pub fn fallback_readme(metadata: &RepositoryMetadata, summary: &CodeAnalysisSummary) -> String {
    let name = &metadata.id.name;
    let full_name = metadata.id.full_name();
    let description = metadata
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or("No description provided");
    let languages = join_or(summary.languages.names().collect(), "an unclassified stack");
    let dependencies = join_or(
        summary.dependencies.iter().map(String::as_str).collect(),
        "No dependencies detected",
    );

    format!(
        r#"# {name}

[![Stars](https://img.shields.io/github/stars/{full_name}?style=social)](https://github.com/{full_name}/stargazers)
[![Forks](https://img.shields.io/github/forks/{full_name}?style=social)](https://github.com/{full_name}/network/members)
[![Language](https://img.shields.io/github/languages/top/{full_name})](https://github.com/{full_name})

## Description
{description}

## Features
- Built with {languages}
- {main_files} main components
- {dependency_count} dependencies

## Installation
```bash
git clone {clone_url}
cd {name}
```

## Dependencies
{dependencies}

## Usage
Please refer to the code examples in the repository.

## Contributing
Contributions are welcome! Please feel free to submit a Pull Request.

## License
This project is licensed under the terms of the license included in the repository.

## Contact
For support, please open an issue in the repository.
"#,
        name = name,
        full_name = full_name,
        description = description,
        languages = languages,
        main_files = summary.main_files.len(),
        dependency_count = summary.dependencies.len(),
        clone_url = metadata.clone_url_or_default(),
        dependencies = dependencies,
    )
}

pub fn fallback_contribution_guidelines(name: &str, language: Option<&str>) -> String {
    let language = language.filter(|l| !l.is_empty()).unwrap_or("the project's language");
    format!(
        r#"# Contributing to {name}

## Setup
1. Fork the repository and clone your fork
2. Install the toolchain for {language}
3. Create a feature branch from the default branch

## Code Style
Follow the conventions already used in the codebase and keep changes focused.

## Pull Requests
1. Describe what the change does and why
2. Reference related issues
3. Keep each pull request to a single concern

## Testing
Add or update tests for every behavior change and make sure the existing suite passes.

## Documentation
Update the README and inline documentation when behavior changes.
"#
    )
}

pub fn fallback_issue_insight(issues: &[IssueRecord]) -> String {
    let open = issues.iter().filter(|i| i.state == IssueState::Open).count();
    let closed = issues.iter().filter(|i| i.state == IssueState::Closed).count();

    let mut text = format!(
        "# Issue Overview\n\n- Total issues: {}\n- Open: {}\n- Closed: {}\n",
        issues.len(),
        open,
        closed
    );

    let recent_open: Vec<_> = issues
        .iter()
        .filter(|i| i.state == IssueState::Open)
        .take(5)
        .collect();
    if !recent_open.is_empty() {
        text.push_str("\n## Open Issues\n");
        for issue in recent_open {
            text.push_str(&format!("- {} ({})\n", issue.title, state_label(issue.state)));
        }
    }
    text
}
