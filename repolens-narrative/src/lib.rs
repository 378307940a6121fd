//! RepoLens Narrative - README, contribution and issue prose
//!
//! Every artifact is produced by one text-generation call. When that call
//! fails, or answers with an error-prefixed string, a deterministic Markdown
//! document built from the same structured inputs is returned instead.

pub mod fallback;
pub mod generator;
pub mod llm_client;
pub mod profile;
pub mod prompts;

pub use generator::{NarrativeGenerator, ReadmeInput, RepositoryStats, ERROR_SENTINEL};
pub use llm_client::GeminiClient;
pub use profile::{ComplexityLevel, ProjectKind, ProjectProfile, TechStack};
