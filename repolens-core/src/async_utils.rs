//! Async utilities

use crate::error::{ErrorContext, RepoLensError, RepoLensResult};
use tokio::time::{timeout, Duration};

/// Timeout wrapper for async operations
pub async fn with_timeout<F, T>(future: F, timeout_ms: u64, operation_name: &str) -> RepoLensResult<T>
where
    F: std::future::Future<Output = T>,
{
    match timeout(Duration::from_millis(timeout_ms), future).await {
        Ok(result) => Ok(result),
        Err(_) => Err(Box::new(RepoLensError::Timeout {
            operation: operation_name.to_string(),
            duration_ms: timeout_ms,
            context: ErrorContext::new("async_utils")
                .with_operation("timeout")
                .with_metadata("timeout_ms", &timeout_ms.to_string())
                .with_suggestion("Increase the configured timeout")
                .with_suggestion("Check network connectivity"),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_timeout_passes_value_through() {
        let value = with_timeout(async { 42 }, 1_000, "answer").await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result = with_timeout(
            tokio::time::sleep(Duration::from_millis(200)),
            10,
            "slow_operation",
        )
        .await;

        match result {
            Err(err) => match *err {
                RepoLensError::Timeout {
                    operation,
                    duration_ms,
                    ..
                } => {
                    assert_eq!(operation, "slow_operation");
                    assert_eq!(duration_ms, 10);
                }
                other => panic!("unexpected error: {other:?}"),
            },
            Ok(_) => panic!("expected a timeout"),
        }
    }
}
