//! Unified error handling system
//!
//! Errors stay inside the crates that produce them: client and generator
//! operations turn them into empty or fallback values before they reach the
//! analysis service. The variants therefore describe where a fetch broke
//! (hosting API, decoding, quota, local clone, text generation) rather than
//! generic failure classes.

use crate::types::RepoId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Results are boxed so the large error enum does not bloat every `Ok` path.
pub type RepoLensResult<T> = Result<T, Box<RepoLensError>>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Where and why an error happened
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique id, logged so a report line can be matched to its cause
    pub error_id: String,
    pub timestamp: DateTime<Utc>,
    /// Component where the error originated, e.g. `github_client`
    pub component: String,
    pub operation: Option<String>,
    /// `owner/name` of the repository being analyzed, if any
    pub repository: Option<String>,
    pub metadata: BTreeMap<String, String>,
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            repository: None,
            metadata: BTreeMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_repository(mut self, repo: &RepoId) -> Self {
        self.repository = Some(repo.full_name());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

#[derive(Error, Debug)]
pub enum RepoLensError {
    /// The hosting API answered, but not with what was asked for
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status of the response, when there was one
        status: Option<u16>,
        context: ErrorContext,
    },

    /// Transport failure: connection, TLS, body read
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },

    /// A payload could not be turned into the expected shape (JSON, base64)
    #[error("Decode error: {message}")]
    Decode {
        message: String,
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },

    /// API access refused because the quota is spent or the client is in fallback mode
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        /// Unix seconds at which the hosting platform resets the quota
        reset_at: Option<i64>,
        context: ErrorContext,
    },

    #[error("Git error: {message}")]
    Git {
        message: String,
        /// The git subcommand that failed, e.g. `clone`
        command: Option<String>,
        context: ErrorContext,
    },

    #[error("LLM error: {message}")]
    Llm {
        message: String,
        provider: Option<String>,
        model: Option<String>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Resource not found: {resource}")]
    NotFound {
        resource: String,
        context: ErrorContext,
    },

    #[error("Operation timeout: {operation} after {duration_ms}ms")]
    Timeout {
        operation: String,
        duration_ms: u64,
        context: ErrorContext,
    },
}

impl RepoLensError {
    pub fn context(&self) -> &ErrorContext {
        match self {
            RepoLensError::Api { context, .. }
            | RepoLensError::Network { context, .. }
            | RepoLensError::Decode { context, .. }
            | RepoLensError::RateLimit { context, .. }
            | RepoLensError::Git { context, .. }
            | RepoLensError::Llm { context, .. }
            | RepoLensError::Config { context, .. }
            | RepoLensError::Validation { context, .. }
            | RepoLensError::NotFound { context, .. }
            | RepoLensError::Timeout { context, .. } => context,
        }
    }

    /// Whether the failure is transient: retrying later, or through the
    /// local-clone path, may succeed. Client errors (4xx other than 403/429),
    /// bad input and bad configuration are not.
    pub fn is_recoverable(&self) -> bool {
        match self {
            RepoLensError::Api { status, .. } => match status {
                Some(403) | Some(429) => true,
                Some(code) => *code >= 500,
                None => true,
            },
            RepoLensError::Network { .. }
            | RepoLensError::RateLimit { .. }
            | RepoLensError::Git { .. }
            | RepoLensError::Llm { .. }
            | RepoLensError::Timeout { .. } => true,
            RepoLensError::Decode { .. }
            | RepoLensError::Config { .. }
            | RepoLensError::Validation { .. }
            | RepoLensError::NotFound { .. } => false,
        }
    }

    /// Log at a level matching how much the caller loses.
    ///
    /// Configuration problems are errors; everything the client degrades
    /// around is a warning. A 404 is routine and only logged at debug.
    pub fn log(&self) {
        let context = self.context();
        match self {
            RepoLensError::Config { .. } | RepoLensError::Validation { .. } => {
                error!(
                    error_id = %context.error_id,
                    component = %context.component,
                    error = %self,
                    "Configuration or validation error"
                );
            }
            RepoLensError::Api {
                status: Some(404), ..
            }
            | RepoLensError::NotFound { .. } => {
                debug!(
                    error_id = %context.error_id,
                    repository = ?context.repository,
                    error = %self,
                    "Resource not found"
                );
            }
            _ => {
                warn!(
                    error_id = %context.error_id,
                    component = %context.component,
                    operation = ?context.operation,
                    repository = ?context.repository,
                    recoverable = self.is_recoverable(),
                    error = %self,
                    "Operation degraded"
                );
            }
        }
    }
}

#[macro_export]
macro_rules! api_error {
    ($msg:expr, $component:expr) => {
        $crate::RepoLensError::Api {
            message: $msg.to_string(),
            status: None,
            context: $crate::ErrorContext::new($component),
        }
    };
    ($msg:expr, $component:expr, $status:expr) => {
        $crate::RepoLensError::Api {
            message: $msg.to_string(),
            status: Some($status),
            context: $crate::ErrorContext::new($component)
                .with_metadata("status", &$status.to_string()),
        }
    };
}

#[macro_export]
macro_rules! git_error {
    ($msg:expr, $command:expr) => {
        $crate::RepoLensError::Git {
            message: $msg.to_string(),
            command: Some($command.to_string()),
            context: $crate::ErrorContext::new("git_fallback").with_operation($command),
        }
    };
}

#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::RepoLensError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file")
                .with_suggestion("Run 'repolens config --init' to create default config"),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::RepoLensError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_metadata("field", &$field.to_string())
                .with_suggestion("Check the field value and format"),
        }
    };
}

#[macro_export]
macro_rules! not_found_error {
    ($resource:expr, $component:expr) => {
        $crate::RepoLensError::NotFound {
            resource: $resource.to_string(),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Verify the repository owner and name")
                .with_suggestion("Private repositories need GITHUB_TOKEN"),
        }
    };
}
