//! Integration tests for repolens-core infrastructure

use std::time::Duration;
use tokio::time::sleep;
use repolens_core::{
    api_error, config_error, init_logging, not_found_error, validation_error, with_timeout,
    ErrorContext, Fetched, LogFormat, LoggingConfig, Provenance, RepoId, RepoLensConfig,
    RepoLensError,
};

#[tokio::test]
async fn test_error_handling() {
    let error = api_error!("Server error", "github_client", 503u16);

    match &error {
        RepoLensError::Api {
            message,
            status,
            context,
        } => {
            assert_eq!(message, "Server error");
            assert_eq!(*status, Some(503));
            assert_eq!(context.component, "github_client");
            assert_eq!(context.metadata.get("status").map(String::as_str), Some("503"));
            assert!(!context.error_id.is_empty());
        }
        _ => panic!("Expected Api error"),
    }
    assert!(error.is_recoverable());

    // Logging must not panic without a subscriber
    error.log();

    let network_error = RepoLensError::Network {
        message: "Connection failed".to_string(),
        source: None,
        context: ErrorContext::new("test").with_repository(&RepoId::new("octo", "demo")),
    };
    assert!(network_error.is_recoverable());
    assert_eq!(network_error.context().repository.as_deref(), Some("octo/demo"));

    let config_error = config_error!("Invalid config", "test");
    assert!(!config_error.is_recoverable());
    assert!(config_error
        .context()
        .recovery_suggestions
        .iter()
        .any(|s| s.contains("repolens config --init")));
}

#[tokio::test]
async fn test_logging_initialization() {
    let config = LoggingConfig {
        level: "debug".to_string(),
        format: LogFormat::Compact,
        filter_directives: vec!["repolens_core=debug".to_string()],
        ..LoggingConfig::default()
    };

    // The global subscriber can only be installed once per process, so a
    // second call must fail cleanly instead of panicking.
    let _ = init_logging(&config);
    let second = init_logging(&config);
    assert!(second.is_err());
}

#[tokio::test]
async fn test_timeout_mechanism() {
    let quick_operation = async {
        sleep(Duration::from_millis(10)).await;
        "Success"
    };

    let result = with_timeout(quick_operation, 100, "quick_test").await;
    assert_eq!(tokio_test::assert_ok!(result), "Success");

    let slow_operation = async {
        sleep(Duration::from_millis(200)).await;
        "Should not reach here"
    };

    let result = with_timeout(slow_operation, 50, "slow_test").await;
    match *result.unwrap_err() {
        RepoLensError::Timeout {
            operation,
            duration_ms,
            ..
        } => {
            assert_eq!(operation, "slow_test");
            assert_eq!(duration_ms, 50);
        }
        _ => panic!("Expected Timeout error"),
    }
}

#[tokio::test]
async fn test_config_validation() {
    let mut config = RepoLensConfig::default();
    tokio_test::assert_ok!(config.validate());

    config.github.timeout_seconds = 0;
    match *config.validate().unwrap_err() {
        RepoLensError::Config { message, context, .. } => {
            assert!(message.contains("timeout"));
            assert_eq!(
                context.metadata.get("field").map(String::as_str),
                Some("github.timeout_seconds")
            );
        }
        _ => panic!("Expected Config error"),
    }
}

#[tokio::test]
async fn test_error_macros() {
    let validation_err = validation_error!("Invalid repository URL", "repository", "repo_url");
    match validation_err {
        RepoLensError::Validation {
            message,
            field,
            context,
        } => {
            assert_eq!(message, "Invalid repository URL");
            assert_eq!(field, Some("repository".to_string()));
            assert_eq!(context.component, "repo_url");
            assert_eq!(context.metadata.get("field").map(String::as_str), Some("repository"));
            assert!(!context.recovery_suggestions.is_empty());
        }
        _ => panic!("Expected Validation error"),
    }

    let not_found_err = not_found_error!("octo/missing", "analysis_service");
    match not_found_err {
        RepoLensError::NotFound { resource, context } => {
            assert_eq!(resource, "octo/missing");
            assert_eq!(context.component, "analysis_service");
            assert!(!context.recovery_suggestions.is_empty());
        }
        _ => panic!("Expected NotFound error"),
    }
}

#[test]
fn test_fetched_serializes_with_status_tag() {
    let fetched: Fetched<u32> = Fetched::Fallback(3);
    assert_eq!(fetched.provenance(), Some(Provenance::GitFallback));

    let json = serde_json::to_value(&fetched).unwrap();
    assert_eq!(json["status"], "fallback");
    assert_eq!(json["value"], 3);

    let empty: Fetched<u32> = Fetched::Empty;
    assert_eq!(serde_json::to_value(&empty).unwrap()["status"], "empty");
}
