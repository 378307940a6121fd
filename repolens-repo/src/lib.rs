//! RepoLens Repository - remote repository access
//!
//! A GitHub REST client that tracks its rate-limit quota and degrades to a
//! shallow local clone once the API becomes unavailable

pub mod api;
pub mod content;
pub mod fallback;
pub mod rate_limit;
pub mod repo_url;

pub use api::GitHubClient;
pub use content::*;
pub use fallback::*;
pub use rate_limit::*;
pub use repo_url::*;
