//! Hosting-platform REST API access

use repolens_core::{ErrorContext, GitHubConfig, RepoLensError, RepoLensResult};

pub mod github;


pub use github::GitHubClient;

/// Helper function to create HTTP client with common configuration
pub(crate) fn create_http_client(config: &GitHubConfig) -> RepoLensResult<reqwest::Client> {
    let mut headers = reqwest::header::HeaderMap::new();

    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_str(&config.user_agent).map_err(|e| {
            RepoLensError::Config {
                message: format!("Invalid user agent: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_client").with_operation("create_client"),
            }
        })?,
    );
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/vnd.github.v3+json"),
    );

    if let Some(token) = config.access_token.as_deref() {
        let mut value = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| RepoLensError::Config {
                message: format!("Invalid access token: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_client")
                    .with_operation("create_client")
                    .with_suggestion("Check GITHUB_TOKEN for stray whitespace"),
            })?;
        value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, value);
    }

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_seconds))
        .default_headers(headers)
        .build()
        .map_err(|e| RepoLensError::Network {
            message: format!("Failed to create HTTP client: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_client").with_operation("create_client"),
        })?;

    Ok(client)
}

/// Build the error for a non-2xx response whose body has already been read
pub(crate) fn response_error(status: u16, url: &str, body: &str, operation: &str) -> RepoLensError {
    RepoLensError::Api {
        message: format!(
            "HTTP {} error for {}: {}",
            status,
            url,
            if body.is_empty() { "empty response" } else { body }
        ),
        status: Some(status),
        context: ErrorContext::new("github_client")
            .with_operation(operation)
            .with_metadata("status", &status.to_string())
            .with_suggestion(match status {
                401 => "Check your access token",
                403 => "Check repository permissions or rate limits",
                404 => "Repository not found or not accessible",
                _ => "Check network connectivity and API status",
            }),
    }
}
