//! RepoLens Analysis - heuristics over fetched repository data
//!
//! Everything here except [`ContentAnalyzer::analyze`] is a pure function of
//! its inputs.

pub mod analyzer;
pub mod feedback;
pub mod languages;
pub mod metrics;
pub mod rules;

pub use analyzer::*;
pub use feedback::*;
pub use languages::*;
pub use metrics::*;
pub use rules::{LanguageRules, RuleRegistry};
