//! RepoLens Applications - analysis workflows
//!
//! Composes the repository client, content analyzer, metrics engine and
//! narrative generator into the four user-facing workflows:
//!
//! - full analysis
//! - developer analysis
//! - README generation
//! - code feedback
//!
//! Presentation layers (the CLI) depend only on this crate and its reports.

pub mod reports;
pub mod service;

pub use reports::{
    CodeFeedback, DeveloperAnalysis, DeveloperMetrics, FeedbackScores, ReadmeReport,
};
pub use service::{AnalysisService, GitHubAnalysisService};

use repolens_core::RepoLensError;

/// Application-level error type
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error("Core error: {0}")]
    Core(#[from] Box<RepoLensError>),

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Unavailable: {message}")]
    Unavailable { message: String },
}

pub type ApplicationResult<T> = Result<T, ApplicationError>;

impl ApplicationError {
    /// Create a not found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create an error for data that exists but could not be retrieved
    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}
