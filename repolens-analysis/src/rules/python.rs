use super::{labels, LanguageRules};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

static IMPORT_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
static FUNCTION_REGEX: OnceLock<Regex> = OnceLock::new();
static CLASS_REGEX: OnceLock<Regex> = OnceLock::new();

fn import_patterns() -> &'static [Regex] {
    IMPORT_PATTERNS.get_or_init(|| {
        [
            r"import\s+([a-zA-Z0-9_]+)",
            r"from\s+([a-zA-Z0-9_.]+)\s+import",
            r"pip\s+install\s+([a-zA-Z0-9_\-]+)",
            r"requirements\.txt.*?([a-zA-Z0-9_\-]+)",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).unwrap())
        .collect()
    })
}

/// Reference ruleset; matches are textual and also fire inside strings and comments
#[derive(Debug, Default, Clone, Copy)]
pub struct PythonRules;

impl LanguageRules for PythonRules {
    fn language(&self) -> &'static str {
        "Python"
    }

    fn detect_dependencies(&self, content: &str) -> BTreeSet<String> {
        import_patterns()
            .iter()
            .flat_map(|regex| regex.captures_iter(content))
            .filter_map(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }

    fn detect_patterns(&self, content: &str) -> Vec<&'static str> {
        let lower = content.to_lowercase();
        let has_class = content.contains("class");
        let mut patterns = Vec::new();

        if has_class {
            patterns.push(labels::OBJECT_ORIENTED);
        }
        if content.contains("def") && !has_class {
            patterns.push(labels::FUNCTIONAL);
        }
        if content.contains("async") || content.contains("await") {
            patterns.push(labels::ASYNCHRONOUS);
        }
        if lower.contains("flask") {
            patterns.push(labels::WEB_APPLICATION);
        }
        if lower.contains("tensorflow") || lower.contains("torch") {
            patterns.push(labels::MACHINE_LEARNING);
        }
        patterns
    }

    fn count_constructs(&self, content: &str) -> (usize, usize) {
        let functions = FUNCTION_REGEX.get_or_init(|| Regex::new(r"def\s+\w+").unwrap());
        let classes = CLASS_REGEX.get_or_init(|| Regex::new(r"class\s+\w+").unwrap());
        (
            functions.find_iter(content).count(),
            classes.find_iter(content).count(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
import os
import numpy as np
from flask import Flask
from sklearn.model_selection import train_test_split
# pip install requests

class Model:
    async def predict(self):
        await self.load()

def main():
    pass
"#;

    #[test]
    fn test_dependencies() {
        let deps = PythonRules.detect_dependencies(SAMPLE);
        let expected: BTreeSet<String> = [
            "os",
            "numpy",
            "flask",
            "sklearn.model_selection",
            "requests",
            // `import train_test_split` also matches the bare import pattern
            "train_test_split",
            "Flask",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        assert_eq!(deps, expected);
    }

    #[test]
    fn test_patterns() {
        let patterns = PythonRules.detect_patterns(SAMPLE);
        assert_eq!(
            patterns,
            vec![
                labels::OBJECT_ORIENTED,
                labels::ASYNCHRONOUS,
                labels::WEB_APPLICATION
            ]
        );

        let functional = PythonRules.detect_patterns("def f(x):\n    return torch.tensor(x)\n");
        assert_eq!(functional, vec![labels::FUNCTIONAL, labels::MACHINE_LEARNING]);
    }

    #[test]
    fn test_counts() {
        assert_eq!(PythonRules.count_constructs(SAMPLE), (2, 1));
        assert_eq!(PythonRules.count_constructs(""), (0, 0));
    }
}
