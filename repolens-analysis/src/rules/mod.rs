//! Pluggable per-language detection rules
//!
//! Each language that has something to say about dependencies, architecture
//! or construct counts implements [`LanguageRules`]. Languages without a
//! ruleset still get classified and line-counted; they just contribute no
//! dependencies, patterns or construct counts.

use std::collections::{BTreeSet, HashMap};

mod javascript;
mod python;
mod rust;

pub use javascript::JavaScriptRules;
pub use python::PythonRules;
pub use rust::RustRules;

/// Architecture pattern labels
pub mod labels {
    pub const OBJECT_ORIENTED: &str = "Object-Oriented";
    pub const FUNCTIONAL: &str = "Functional";
    pub const ASYNCHRONOUS: &str = "Asynchronous";
    pub const WEB_APPLICATION: &str = "Web Application";
    pub const MACHINE_LEARNING: &str = "Machine Learning";
}

/// Detection rules for one language
pub trait LanguageRules: Send + Sync {
    /// Language name as produced by [`crate::detect_language`]
    fn language(&self) -> &'static str;

    /// Dependency identifiers referenced by the file
    fn detect_dependencies(&self, content: &str) -> BTreeSet<String>;

    /// Architecture labels; several may apply to one file
    fn detect_patterns(&self, content: &str) -> Vec<&'static str>;

    /// `(functions, classes)`
    fn count_constructs(&self, content: &str) -> (usize, usize);
}

/// Language name -> ruleset
pub struct RuleRegistry {
    rules: HashMap<&'static str, Box<dyn LanguageRules>>,
}

impl RuleRegistry {
    /// A registry without any rulesets
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    pub fn register(&mut self, rules: Box<dyn LanguageRules>) {
        self.rules.insert(rules.language(), rules);
    }

    pub fn get(&self, language: &str) -> Option<&dyn LanguageRules> {
        self.rules.get(language).map(|rules| rules.as_ref())
    }

    pub fn languages(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.keys().copied()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(PythonRules));
        registry.register(Box::new(RustRules));
        registry.register(Box::new(JavaScriptRules::javascript()));
        registry.register(Box::new(JavaScriptRules::typescript()));
        registry
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut languages: Vec<_> = self.languages().collect();
        languages.sort_unstable();
        f.debug_struct("RuleRegistry")
            .field("languages", &languages)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_languages() {
        let registry = RuleRegistry::default();
        for language in ["Python", "Rust", "JavaScript", "TypeScript"] {
            assert!(registry.get(language).is_some(), "{language} missing");
        }
        assert!(registry.get("Go").is_none());
    }

    #[test]
    fn test_custom_ruleset_can_be_registered() {
        struct GoRules;

        impl LanguageRules for GoRules {
            fn language(&self) -> &'static str {
                "Go"
            }

            fn detect_dependencies(&self, content: &str) -> BTreeSet<String> {
                content
                    .lines()
                    .filter_map(|l| l.trim().strip_prefix("import \""))
                    .map(|rest| rest.trim_end_matches('"').to_string())
                    .collect()
            }

            fn detect_patterns(&self, _content: &str) -> Vec<&'static str> {
                Vec::new()
            }

            fn count_constructs(&self, content: &str) -> (usize, usize) {
                (content.matches("func ").count(), 0)
            }
        }

        let mut registry = RuleRegistry::empty();
        registry.register(Box::new(GoRules));

        let go = registry.get("Go").unwrap();
        assert_eq!(go.count_constructs("func a() {}\nfunc b() {}"), (2, 0));
        assert!(go.detect_dependencies("import \"fmt\"").contains("fmt"));
    }
}
