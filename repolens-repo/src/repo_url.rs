//! Repository identifier parsing

use repolens_core::{ErrorContext, RepoId, RepoLensError, RepoLensResult};
use url::Url;

const GITHUB_HOSTS: &[&str] = &["github.com", "www.github.com"];

/// Parse `https://github.com/<owner>/<repo>[.git][/...]` or `<owner>/<repo>`
pub fn parse_repo_url(input: &str) -> RepoLensResult<RepoId> {
    let input = input.trim();

    if input.starts_with("http://") || input.starts_with("https://") {
        let parsed_url = Url::parse(input).map_err(|e| {
            invalid(
                &format!("Invalid repository URL: {}", e),
                "Ensure the URL is valid and properly formatted",
            )
        })?;

        let host = parsed_url.host_str().unwrap_or_default().to_lowercase();
        if !GITHUB_HOSTS.contains(&host.as_str()) {
            return Err(invalid(
                &format!("Unsupported repository host: {}", host),
                "Only github.com repositories are supported",
            ));
        }

        let segments: Vec<&str> = parsed_url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        return match segments.as_slice() {
            [owner, name, ..] => build(owner, name.trim_end_matches(".git")),
            _ => Err(invalid(
                "URL must contain owner and repository name",
                "URL should be in format: https://github.com/owner/repo",
            )),
        };
    }

    match input.split('/').collect::<Vec<_>>().as_slice() {
        [owner, name] => build(owner, name.trim_end_matches(".git")),
        _ => Err(invalid(
            &format!("Not a repository reference: {}", input),
            "Use owner/repo or https://github.com/owner/repo",
        )),
    }
}

fn build(owner: &str, name: &str) -> RepoLensResult<RepoId> {
    let valid = |part: &str| {
        // Dot-only segments would be resolved as relative paths in API URLs
        !part.is_empty()
            && !part.chars().all(|c| c == '.')
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    };

    if valid(owner) && valid(name) {
        Ok(RepoId::new(owner, name))
    } else {
        Err(invalid(
            &format!("Invalid owner or repository name: {}/{}", owner, name),
            "Names may only contain letters, digits, '-', '_' and '.'",
        ))
    }
}

fn invalid(message: &str, suggestion: &str) -> Box<RepoLensError> {
    Box::new(RepoLensError::Validation {
        message: message.to_string(),
        field: Some("repository".to_string()),
        context: ErrorContext::new("repo_url")
            .with_operation("parse_repo_url")
            .with_suggestion(suggestion),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_urls() {
        let id = parse_repo_url("https://github.com/rust-lang/cargo").unwrap();
        assert_eq!(id, RepoId::new("rust-lang", "cargo"));

        let id = parse_repo_url("https://github.com/rust-lang/cargo.git").unwrap();
        assert_eq!(id.name, "cargo");

        let id = parse_repo_url("https://github.com/tokio-rs/tokio/tree/master/tokio").unwrap();
        assert_eq!(id.full_name(), "tokio-rs/tokio");
    }

    #[test]
    fn test_dotted_names_are_allowed() {
        let id = parse_repo_url("octo/.github").unwrap();
        assert_eq!(id.name, ".github");

        let id = parse_repo_url("octo/my.repo").unwrap();
        assert_eq!(id.name, "my.repo");
    }

    #[test]
    fn test_parse_shorthand() {
        let id = parse_repo_url("  serde-rs/serde ").unwrap();
        assert_eq!(id, RepoId::new("serde-rs", "serde"));
    }

    #[test]
    fn test_rejects_invalid_input() {
        for input in [
            "",
            "just-a-name",
            "https://gitlab.com/owner/repo",
            "https://github.com/owner",
            "owner/repo/extra",
            "own er/repo",
            "not a url at all",
            "octo/..",
            "octo/.",
            "../repo",
            "https://github.com/octo/..",
        ] {
            let err = parse_repo_url(input).unwrap_err();
            assert!(
                matches!(*err, RepoLensError::Validation { .. }),
                "expected validation error for {input:?}"
            );
        }
    }
}
